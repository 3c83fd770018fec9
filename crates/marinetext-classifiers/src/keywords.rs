//! Environmental keyword extraction
//!
//! Matching is exact per whitespace token, compared lowercase. Punctuation
//! stays attached to the token, so `pollution.` does not match `pollution`
//! and `temperatures` does not match `temperature`.

/// Fixed environmental vocabulary, lowercase
pub const ENVIRONMENTAL_VOCABULARY: [&str; 8] = [
    "ocean",
    "sea",
    "coral",
    "pollution",
    "plastic",
    "temperature",
    "marine",
    "ecosystem",
];

/// Shown when no token matches the vocabulary
pub const NO_KEYWORDS_FOUND: &str = "No specific environmental keywords found.";

/// Tokens of `text` that belong to the vocabulary.
///
/// Original casing, input order and duplicates are preserved.
pub fn extract_keywords(text: &str) -> Vec<&str> {
    text.split(is_separator)
        .filter(|token| !token.is_empty() && is_vocabulary_term(token))
        .collect()
}

/// Unicode whitespace plus the ASCII information separators (U+001C..=U+001F),
/// which also delimit words in the dashboard's tokenization.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Case-insensitive membership test against [`ENVIRONMENTAL_VOCABULARY`]
pub fn is_vocabulary_term(token: &str) -> bool {
    let lowered = token.to_lowercase();
    ENVIRONMENTAL_VOCABULARY.contains(&lowered.as_str())
}

/// Join matched keywords with ", ", or return [`NO_KEYWORDS_FOUND`]
pub fn format_keywords(keywords: &[&str]) -> String {
    if keywords.is_empty() {
        NO_KEYWORDS_FOUND.to_string()
    } else {
        keywords.join(", ")
    }
}

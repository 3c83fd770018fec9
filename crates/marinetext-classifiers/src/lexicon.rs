//! Lightweight lexicon classifiers
//!
//! Used when a models file declares a `builtin` source, e.g. for offline
//! demos. Each label owns a word list; scores are add-one smoothed hit
//! ratios, so text without any hit ranks the first declared label highest.

use crate::classifier::{rank_scores, ClassificationResult, Classifier};
use aho_corasick::{AhoCorasick, MatchKind};
use marinetext_core::{Error, Result};
use std::time::Instant;

/// Built-in implementation names accepted in `builtin` model sources
pub const BUILTIN_IMPLEMENTATIONS: [&str; 3] = [
    "sentiment-lexicon",
    "emotion-lexicon",
    "hate_speech-lexicon",
];

type Lexicon = &'static [(&'static str, &'static [&'static str])];

// Label names follow the pretrained models they stand in for.
const SENTIMENT_LEXICON: Lexicon = &[
    (
        "POSITIVE",
        &[
            "good", "great", "excellent", "love", "amazing", "wonderful", "happy", "fantastic",
            "awesome", "best", "thriving", "healthy",
        ],
    ),
    (
        "NEGATIVE",
        &[
            "bad", "terrible", "awful", "hate", "horrible", "worst", "sad", "angry",
            "disappointed", "poor", "dying", "destroyed",
        ],
    ),
];

const EMOTION_LEXICON: Lexicon = &[
    ("joy", &["happy", "glad", "joy", "delighted", "excited", "cheerful"]),
    ("sadness", &["sad", "unhappy", "grief", "dying", "lost", "mourn"]),
    ("anger", &["angry", "furious", "outraged", "rage", "mad", "hate"]),
    ("fear", &["afraid", "scared", "fear", "worried", "terrified", "anxious"]),
    ("love", &["love", "adore", "cherish", "beloved", "caring"]),
    ("surprise", &["surprised", "amazed", "astonished", "shocked", "unexpected"]),
];

const HATE_SPEECH_LEXICON: Lexicon = &[
    ("NON_HATE", &[]),
    ("HATE", &["vermin", "subhuman", "scum", "filth", "exterminate"]),
];

pub struct LexiconClassifier {
    name: String,
    labels: Vec<String>,
    matcher: AhoCorasick,
    pattern_labels: Vec<usize>,
}

impl LexiconClassifier {
    /// Build a classifier from `(label, words)` pairs; the first label is the default
    pub fn new(name: impl Into<String>, lexicon: &[(&str, &[&str])]) -> Result<Self> {
        if lexicon.is_empty() {
            return Err(Error::classifier("Lexicon classifier needs at least one label"));
        }

        let mut labels = Vec::with_capacity(lexicon.len());
        let mut patterns = Vec::new();
        let mut pattern_labels = Vec::new();

        for (label_idx, (label, words)) in lexicon.iter().enumerate() {
            labels.push(label.to_string());
            for word in words.iter() {
                patterns.push(*word);
                pattern_labels.push(label_idx);
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| Error::classifier(format!("Failed to build lexicon matcher: {e}")))?;

        Ok(Self {
            name: name.into(),
            labels,
            matcher,
            pattern_labels,
        })
    }

    /// Look up one of [`BUILTIN_IMPLEMENTATIONS`] by name
    pub fn builtin(implementation: &str) -> Result<Self> {
        let lexicon = match implementation {
            "sentiment-lexicon" => SENTIMENT_LEXICON,
            "emotion-lexicon" => EMOTION_LEXICON,
            "hate_speech-lexicon" => HATE_SPEECH_LEXICON,
            other => {
                return Err(Error::classifier(format!(
                    "Unknown builtin implementation '{}' (expected one of: {})",
                    other,
                    BUILTIN_IMPLEMENTATIONS.join(", ")
                )))
            }
        };
        Self::new(implementation, lexicon)
    }

    fn count_hits(&self, text: &str) -> Vec<f32> {
        let mut hits = vec![0.0f32; self.labels.len()];
        for m in self.matcher.find_iter(text) {
            if is_word_boundary(text, m.start(), m.end()) {
                hits[self.pattern_labels[m.pattern().as_usize()]] += 1.0;
            }
        }
        hits
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

#[async_trait::async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<ClassificationResult>> {
        let start = Instant::now();

        let hits = self.count_hits(text);
        let total: f32 = hits.iter().sum::<f32>() + self.labels.len() as f32;
        let scores: Vec<f32> = hits.iter().map(|h| (h + 1.0) / total).collect();

        tracing::debug!(classifier = %self.name, ?hits, "lexicon classification");

        Ok(rank_scores(
            &self.labels,
            &scores,
            &self.name,
            start.elapsed().as_micros() as u64,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Text analysis: top prediction plus environmental keywords

use crate::keywords::{extract_keywords, format_keywords};
use crate::registry::ModelRegistry;
use marinetext_core::{Error, ModelChoice, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Summary returned for empty or whitespace-only input
pub const EMPTY_INPUT_WARNING: &str = "⚠️ Please enter some text to analyze.";

/// Result of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Markdown summary of the top prediction (or the empty-input warning)
    pub summary: String,

    /// Comma-joined matched keywords, the no-match sentinel, or empty for empty input
    pub keywords: String,

    /// Structured form of the top prediction; absent for empty input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
}

/// Top-ranked label for the chosen model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub model: ModelChoice,
    pub label: String,
    pub score: f32,
}

impl AnalysisOutput {
    fn empty_input() -> Self {
        Self {
            summary: EMPTY_INPUT_WARNING.to_string(),
            keywords: String::new(),
            prediction: None,
        }
    }
}

/// Format the two-line markdown summary for a prediction
pub fn format_summary(label: &str, score: f32) -> String {
    format!("**Prediction:** {}  \n**Confidence:** {:.2}", label, score)
}

/// Runs the chosen classifier and extracts keywords
#[derive(Clone)]
pub struct Analyzer {
    registry: Arc<ModelRegistry>,
}

impl Analyzer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Analyze `text` with the classifier registered for `choice`.
    ///
    /// Empty or whitespace-only text returns the warning without calling the
    /// classifier. Classifier errors are returned unchanged.
    pub async fn analyze(&self, text: &str, choice: ModelChoice) -> Result<AnalysisOutput> {
        if text.trim().is_empty() {
            return Ok(AnalysisOutput::empty_input());
        }

        let classifier = self.registry.get(choice);
        let ranked = classifier.classify(text).await?;
        let top = ranked.into_iter().next().ok_or_else(|| {
            Error::classifier(format!("{} returned no predictions", classifier.name()))
        })?;

        debug!(
            model = %choice,
            label = %top.label,
            score = top.score,
            latency_us = top.latency_us,
            "classified text"
        );

        let keywords = extract_keywords(text);

        Ok(AnalysisOutput {
            summary: format_summary(&top.label, top.score),
            keywords: format_keywords(&keywords),
            prediction: Some(Prediction {
                model: choice,
                label: top.label,
                score: top.score,
            }),
        })
    }
}

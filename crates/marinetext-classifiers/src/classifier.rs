//! Classifier trait and common types

use async_trait::async_trait;
use marinetext_core::Result;

/// Trait for all classifiers
///
/// Implementations return every label they know about, ranked by descending
/// score. The first entry is the prediction.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<Vec<ClassificationResult>>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Classification label
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Attach the producing model's name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.metadata.model = Some(model.into());
        self
    }

    /// Set the measured latency
    pub fn with_latency_us(mut self, latency_us: u64) -> Self {
        self.latency_us = latency_us;
        self
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,
}

/// Build a ranked result list from parallel label/probability slices.
///
/// Ties keep the label order given, so the first declared label wins.
pub fn rank_scores(
    labels: &[String],
    scores: &[f32],
    model: &str,
    latency_us: u64,
) -> Vec<ClassificationResult> {
    let mut ranked: Vec<ClassificationResult> = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            ClassificationResult::new(label.clone(), scores.get(idx).copied().unwrap_or(0.0))
                .with_model(model)
                .with_latency_us(latency_us)
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

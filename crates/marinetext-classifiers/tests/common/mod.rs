//! Mock classifiers for testing
//!
//! Configurable implementations of the Classifier trait for exercising the
//! analyzer and registry without model downloads.

#![allow(dead_code)]

use async_trait::async_trait;
use marinetext_classifiers::{Classifier, ClassificationResult, ModelRegistry};
use marinetext_core::{ModelChoice, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A mock classifier returning a fixed ranking
pub struct MockClassifier {
    name: String,
    ranking: Vec<(String, f32)>,
    call_count: AtomicU32,
}

impl MockClassifier {
    /// Create a new mock classifier with the given name and a neutral prediction
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ranking: vec![("neutral".to_string(), 0.5)],
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the ranked labels this classifier will return
    pub fn with_ranking(mut self, ranking: &[(&str, f32)]) -> Self {
        self.ranking = ranking
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect();
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<ClassificationResult>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        Ok(self
            .ranking
            .iter()
            .map(|(label, score)| {
                ClassificationResult::new(label.clone(), *score)
                    .with_model(self.name.clone())
                    .with_latency_us(100)
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier {
    name: String,
    error_message: String,
}

impl FailingClassifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error_message: "Simulated classifier failure".to_string(),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<ClassificationResult>> {
        Err(marinetext_core::Error::classifier(&self.error_message))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The three mocks used across tests, one per model choice
pub struct MockSet {
    pub sentiment: Arc<MockClassifier>,
    pub emotion: Arc<MockClassifier>,
    pub hate_speech: Arc<MockClassifier>,
}

impl MockSet {
    pub fn new() -> Self {
        Self {
            sentiment: Arc::new(
                MockClassifier::new("mock-sentiment")
                    .with_ranking(&[("NEGATIVE", 0.9876), ("POSITIVE", 0.0124)]),
            ),
            emotion: Arc::new(
                MockClassifier::new("mock-emotion")
                    .with_ranking(&[("sadness", 0.613), ("fear", 0.2), ("joy", 0.187)]),
            ),
            hate_speech: Arc::new(
                MockClassifier::new("mock-hate").with_ranking(&[("NON_HATE", 0.995), ("HATE", 0.005)]),
            ),
        }
    }

    pub fn registry(&self) -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::builder()
                .register(ModelChoice::SentimentAnalysis, self.sentiment.clone())
                .register(ModelChoice::EmotionDetection, self.emotion.clone())
                .register(ModelChoice::HateSpeechDetection, self.hate_speech.clone())
                .build()
                .unwrap(),
        )
    }
}

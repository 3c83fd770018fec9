//! Core types for Marinetext

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the pre-trained models offered in the dashboard dropdown.
///
/// Serialized by display name ("Sentiment Analysis"); the short registry key
/// ("sentiment") is accepted as an alias when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ModelChoice {
    /// General positive/negative sentiment
    #[default]
    #[serde(rename = "Sentiment Analysis", alias = "sentiment")]
    SentimentAnalysis,

    /// Emotion categories (joy, sadness, anger, ...)
    #[serde(rename = "Emotion Detection", alias = "emotion")]
    EmotionDetection,

    /// Hate / non-hate speech
    #[serde(rename = "Hate Speech Detection", alias = "hate_speech")]
    HateSpeechDetection,
}

impl ModelChoice {
    /// Every choice, in dropdown order
    pub const ALL: [ModelChoice; 3] = [
        Self::SentimentAnalysis,
        Self::EmotionDetection,
        Self::HateSpeechDetection,
    ];

    /// Human-readable name shown in the UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SentimentAnalysis => "Sentiment Analysis",
            Self::EmotionDetection => "Emotion Detection",
            Self::HateSpeechDetection => "Hate Speech Detection",
        }
    }

    /// Key of this choice in the model registry file
    pub fn registry_key(&self) -> &'static str {
        match self {
            Self::SentimentAnalysis => "sentiment",
            Self::EmotionDetection => "emotion",
            Self::HateSpeechDetection => "hate_speech",
        }
    }

    /// Position in [`ModelChoice::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Self::SentimentAnalysis => 0,
            Self::EmotionDetection => 1,
            Self::HateSpeechDetection => 2,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|choice| {
                choice.display_name().eq_ignore_ascii_case(trimmed)
                    || choice.registry_key().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| Error::unknown_model(trimmed))
    }
}

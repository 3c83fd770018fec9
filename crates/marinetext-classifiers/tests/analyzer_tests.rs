mod common;

use common::{FailingClassifier, MockClassifier, MockSet};
use marinetext_classifiers::{
    Analyzer, BuiltinModelLoader, ModelRegistry, EMPTY_INPUT_WARNING, NO_KEYWORDS_FOUND,
};
use marinetext_core::{Error, ModelChoice};
use std::sync::Arc;

#[tokio::test]
async fn test_empty_input_never_calls_classifier() {
    let mocks = MockSet::new();
    let analyzer = Analyzer::new(mocks.registry());

    for text in ["", "   ", "\n\t  "] {
        for choice in ModelChoice::ALL {
            let output = analyzer.analyze(text, choice).await.unwrap();
            assert_eq!(output.summary, EMPTY_INPUT_WARNING);
            assert_eq!(output.keywords, "");
            assert!(output.prediction.is_none());
        }
    }

    assert_eq!(mocks.sentiment.call_count(), 0);
    assert_eq!(mocks.emotion.call_count(), 0);
    assert_eq!(mocks.hate_speech.call_count(), 0);
}

#[tokio::test]
async fn test_summary_uses_top_ranked_result() {
    let mocks = MockSet::new();
    let analyzer = Analyzer::new(mocks.registry());

    let output = analyzer
        .analyze("The reef looks grim", ModelChoice::EmotionDetection)
        .await
        .unwrap();

    assert_eq!(output.summary, "**Prediction:** sadness  \n**Confidence:** 0.61");
    let prediction = output.prediction.unwrap();
    assert_eq!(prediction.model, ModelChoice::EmotionDetection);
    assert_eq!(prediction.label, "sadness");
    assert_eq!(mocks.emotion.call_count(), 1);
    assert_eq!(mocks.sentiment.call_count(), 0);
}

#[tokio::test]
async fn test_coral_reef_scenario() {
    let mocks = MockSet::new();
    let analyzer = Analyzer::new(mocks.registry());

    let output = analyzer
        .analyze(
            "Coral reefs are dying due to rising sea temperatures and pollution.",
            ModelChoice::SentimentAnalysis,
        )
        .await
        .unwrap();

    assert_eq!(output.summary, "**Prediction:** NEGATIVE  \n**Confidence:** 0.99");
    // exact token matching: "temperatures" and "pollution." are not vocabulary terms
    assert_eq!(output.keywords, "Coral, sea");
}

#[tokio::test]
async fn test_keyword_properties() {
    let mocks = MockSet::new();
    let analyzer = Analyzer::new(mocks.registry());

    let cases = [
        ("Ocean Pollution", "Ocean, Pollution"),
        ("ocean ocean coral", "ocean, ocean, coral"),
        ("The weather is nice today", NO_KEYWORDS_FOUND),
    ];

    for (text, expected) in cases {
        let output = analyzer
            .analyze(text, ModelChoice::HateSpeechDetection)
            .await
            .unwrap();
        assert_eq!(output.keywords, expected, "input: {text}");
    }
}

#[tokio::test]
async fn test_classifier_error_propagates() {
    let registry = ModelRegistry::builder()
        .register(
            ModelChoice::SentimentAnalysis,
            Arc::new(FailingClassifier::new("broken").with_error("weights corrupted")),
        )
        .register(ModelChoice::EmotionDetection, Arc::new(MockClassifier::new("e")))
        .register(ModelChoice::HateSpeechDetection, Arc::new(MockClassifier::new("h")))
        .build()
        .unwrap();
    let analyzer = Analyzer::new(Arc::new(registry));

    let err = analyzer
        .analyze("plastic in the sea", ModelChoice::SentimentAnalysis)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Classifier(msg) if msg == "weights corrupted"));

    // other choices are unaffected
    assert!(analyzer
        .analyze("plastic in the sea", ModelChoice::EmotionDetection)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_empty_ranking_is_an_error() {
    let empty = Arc::new(MockClassifier::new("empty").with_ranking(&[]));
    let registry = ModelRegistry::builder()
        .register(ModelChoice::SentimentAnalysis, empty.clone())
        .register(ModelChoice::EmotionDetection, empty.clone())
        .register(ModelChoice::HateSpeechDetection, empty)
        .build()
        .unwrap();
    let analyzer = Analyzer::new(Arc::new(registry));

    let result = analyzer.analyze("marine life", ModelChoice::EmotionDetection).await;
    assert!(matches!(result, Err(Error::Classifier(_))));
}

#[tokio::test]
async fn test_offline_registry_end_to_end() {
    let registry = ModelRegistry::load(&BuiltinModelLoader::offline()).await.unwrap();
    let analyzer = Analyzer::new(Arc::new(registry));

    let output = analyzer
        .analyze("The marine ecosystem is thriving", ModelChoice::SentimentAnalysis)
        .await
        .unwrap();

    assert_eq!(output.summary, "**Prediction:** POSITIVE  \n**Confidence:** 0.67");
    assert_eq!(output.keywords, "marine, ecosystem");
}

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use marinetext_classifiers::{
    Analyzer, BuiltinModelLoader, ClassificationResult, Classifier, ModelRegistry,
    EMPTY_INPUT_WARNING,
};
use marinetext_core::{Error, ModelChoice, Result};
use marinetext_demo::{build_app, load_registry, AppState, DemoConfig};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

struct BrokenClassifier;

#[async_trait]
impl Classifier for BrokenClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<ClassificationResult>> {
        Err(Error::classifier("inference backend unavailable"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

async fn offline_app() -> Router {
    let registry = ModelRegistry::load(&BuiltinModelLoader::offline())
        .await
        .unwrap();
    let state = AppState::new(Analyzer::new(Arc::new(registry)), DemoConfig::default());
    build_app(state)
}

async fn offline_app_with_config(config: DemoConfig) -> Router {
    let registry = ModelRegistry::load(&BuiltinModelLoader::offline())
        .await
        .unwrap();
    build_app(AppState::new(Analyzer::new(Arc::new(registry)), config))
}

fn get_with_origin(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

fn broken_app() -> Router {
    let registry = ModelRegistry::builder()
        .register(ModelChoice::SentimentAnalysis, Arc::new(BrokenClassifier))
        .register(ModelChoice::EmotionDetection, Arc::new(BrokenClassifier))
        .register(ModelChoice::HateSpeechDetection, Arc::new(BrokenClassifier))
        .build()
        .unwrap();
    build_app(AppState::new(
        Analyzer::new(Arc::new(registry)),
        DemoConfig::default(),
    ))
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = offline_app().await.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_models_lists_choices_in_order() {
    let response = offline_app().await.oneshot(get("/api/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body["models"],
        serde_json::json!(["Sentiment Analysis", "Emotion Detection", "Hate Speech Detection"])
    );
    assert_eq!(body["default"], "Sentiment Analysis");
}

#[tokio::test]
async fn test_analyze_returns_summary_and_keywords() {
    let request = post_json(
        "/api/analyze",
        serde_json::json!({
            "text": "The marine ecosystem is thriving",
            "model": "Sentiment Analysis",
        })
        .to_string(),
    );
    let response = offline_app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"], "**Prediction:** POSITIVE  \n**Confidence:** 0.67");
    assert_eq!(body["keywords"], "marine, ecosystem");
    assert_eq!(body["prediction"]["model"], "Sentiment Analysis");
    assert_eq!(body["prediction"]["label"], "POSITIVE");
}

#[tokio::test]
async fn test_analyze_accepts_registry_key() {
    let request = post_json(
        "/api/analyze",
        serde_json::json!({ "text": "plastic in the sea", "model": "hate_speech" }).to_string(),
    );
    let response = offline_app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["prediction"]["model"], "Hate Speech Detection");
    assert_eq!(body["keywords"], "plastic, sea");
}

#[tokio::test]
async fn test_empty_text_returns_warning() {
    let request = post_json(
        "/api/analyze",
        serde_json::json!({ "text": "   ", "model": "Emotion Detection" }).to_string(),
    );
    let response = broken_app().oneshot(request).await.unwrap();

    // never reaches the classifier, so the broken backend is irrelevant
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["summary"], EMPTY_INPUT_WARNING);
    assert_eq!(body["keywords"], "");
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn test_unknown_model_is_rejected() {
    let request = post_json(
        "/api/analyze",
        serde_json::json!({ "text": "coral", "model": "Topic Modeling" }).to_string(),
    );
    let response = offline_app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Topic Modeling"));
}

#[tokio::test]
async fn test_classifier_failure_is_server_error() {
    let request = post_json(
        "/api/analyze",
        serde_json::json!({ "text": "ocean warming", "model": "Sentiment Analysis" }).to_string(),
    );
    let response = broken_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("inference backend unavailable"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let text = "ocean ".repeat(20_000);
    let request = post_json(
        "/api/analyze",
        serde_json::json!({ "text": text }).to_string(),
    );
    let response = offline_app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_index_page_is_served() {
    for uri in ["/", "/some/client/route"] {
        let response = offline_app().await.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("Marine Text Intelligence Dashboard"));
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = offline_app().await.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let registry = ModelRegistry::load(&BuiltinModelLoader::offline())
        .await
        .unwrap();
    let state = AppState::new(Analyzer::new(Arc::new(registry)), DemoConfig::default())
        .with_metrics(handle);

    let response = build_app(state).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_offline_models_file_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/offline.yaml");
    let registry = load_registry(Some(path.as_path())).await.unwrap();

    assert_eq!(
        registry.get(ModelChoice::EmotionDetection).name(),
        "emotion-lexicon"
    );
}

#[tokio::test]
async fn test_missing_models_file_fails() {
    let result = load_registry(Some(PathBuf::from("/nonexistent/models.yaml").as_path())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cors_allows_local_origin() {
    let response = offline_app()
        .await
        .oneshot(get_with_origin("/api/health", "http://localhost:7860"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:7860"
    );
}

#[tokio::test]
async fn test_cors_ignores_foreign_origin() {
    let response = offline_app()
        .await
        .oneshot(get_with_origin("/api/health", "http://evil.example"))
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_any_origin_when_enabled() {
    let config = DemoConfig {
        allow_any_origin: true,
        ..DemoConfig::default()
    };
    let response = offline_app_with_config(config)
        .await
        .oneshot(get_with_origin("/api/health", "http://evil.example"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_models_follow_registry_choices() {
    let registry = ModelRegistry::load(&BuiltinModelLoader::offline())
        .await
        .unwrap();
    let expected: Vec<&str> = registry
        .choices()
        .iter()
        .map(|choice| choice.display_name())
        .collect();

    let response = offline_app().await.oneshot(get("/api/models")).await.unwrap();
    assert_eq!(json_body(response).await["models"], serde_json::json!(expected));
}

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use marinetext_core::ModelChoice;
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ============================================================================
// Health endpoints
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================================
// Model endpoints
// ============================================================================

pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let models: Vec<&str> = state
        .analyzer
        .registry()
        .choices()
        .iter()
        .map(|choice| choice.display_name())
        .collect();

    Json(serde_json::json!({
        "models": models,
        "default": ModelChoice::default().display_name(),
    }))
}

// ============================================================================
// Analysis endpoints
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,

    /// Display name or key; defaults to "Sentiment Analysis"
    #[serde(default)]
    pub model: Option<String>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> Response {
    let choice = match req.model.as_deref() {
        None => ModelChoice::default(),
        Some(name) => match name.parse::<ModelChoice>() {
            Ok(choice) => choice,
            Err(e) => {
                tracing::warn!("Rejected analysis request: {}", e);
                metrics::counter!("marinetext_errors_total", "kind" => "unknown_model")
                    .increment(1);
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
            }
        },
    };

    let start = Instant::now();
    match state.analyzer.analyze(&req.text, choice).await {
        Ok(output) => {
            metrics::counter!("marinetext_analyses_total", "model" => choice.registry_key())
                .increment(1);
            metrics::histogram!("marinetext_analysis_latency_us", "model" => choice.registry_key())
                .record(start.elapsed().as_micros() as f64);
            Json(output).into_response()
        }
        Err(e) => {
            tracing::error!("Analysis with {} failed: {}", choice, e);
            metrics::counter!("marinetext_errors_total", "kind" => "classifier").increment(1);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Metrics endpoint
// ============================================================================

pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "metrics exporter not installed".to_string(),
        ),
    }
}

use axum::{
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web"]
struct WebAssets;

/// Serve the embedded dashboard page and its assets
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Try exact path first
    if let Some(content) = <WebAssets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response();
    }

    // Single page: any unmatched route gets the dashboard
    if let Some(content) = <WebAssets as Embed>::get("index.html") {
        return Html(String::from_utf8_lossy(&content.data).to_string()).into_response();
    }

    Html(FALLBACK_HTML.to_string()).into_response()
}

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Marine Text Intelligence Dashboard</title>
</head>
<body style="background-color:#0a192f;color:#ccd6f6;font-family:sans-serif;text-align:center;padding:40px">
    <h1 style="color:#64ffda">🌊 Marine Text Intelligence Dashboard</h1>
    <p>The web UI was not embedded in this build. The API is available at
    <code>POST /api/analyze</code>.</p>
</body>
</html>
"#;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use prospect_common::{ProspectError, ScrapeMode};
use prospect_extract::{ContentResult, ExtractionPipeline, ExtractionResult};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

pub struct AppState {
    pub pipeline: ExtractionPipeline,
}

pub type SharedState = Arc<AppState>;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request-level failures. Per-URL failures never surface here; they are
/// folded into the result list instead.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ScrapeResults {
    Contact(Vec<ExtractionResult>),
    Content(Vec<ContentResult>),
}

#[derive(Serialize)]
struct ScrapeResponse {
    mode: ScrapeMode,
    count: usize,
    results: ScrapeResults,
}

async fn scrape_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let urls = parse_urls(&body)?;
    let mode = parse_mode(&headers)?;

    let request_id = Uuid::new_v4();
    info!(%request_id, mode = %mode, urls = urls.len(), "processing scrape request");

    // Batches run in their own task so an unexpected panic inside the
    // pipeline surfaces as a 500 instead of tearing the process down.
    let results = match mode {
        ScrapeMode::Contact => {
            let pipeline_state = state.clone();
            let batch = tokio::spawn(async move { pipeline_state.pipeline.contact_batch(&urls).await })
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            ScrapeResults::Contact(batch)
        }
        ScrapeMode::Content => {
            let pipeline_state = state.clone();
            let batch = tokio::spawn(async move { pipeline_state.pipeline.content_batch(&urls).await })
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            ScrapeResults::Content(batch)
        }
    };

    let count = match &results {
        ScrapeResults::Contact(r) => r.len(),
        ScrapeResults::Content(r) => r.len(),
    };

    Ok(Json(ScrapeResponse {
        mode,
        count,
        results,
    }))
}

fn parse_urls(body: &Value) -> Result<Vec<String>, ApiError> {
    let raw = body
        .get("urls")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::BadRequest("Provide urls array in body".to_string()))?;

    if raw.is_empty() {
        return Err(ApiError::BadRequest(
            "Provide a non-empty urls array".to_string(),
        ));
    }

    raw.iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                ApiError::BadRequest("urls must be an array of strings".to_string())
            })
        })
        .collect()
}

/// Mode comes from the `x-mode` header (older deployments send `mode`),
/// defaulting to contact extraction.
fn parse_mode(headers: &HeaderMap) -> Result<ScrapeMode, ApiError> {
    let raw = headers
        .get("x-mode")
        .or_else(|| headers.get("mode"))
        .map(|v| v.to_str().unwrap_or(""))
        .unwrap_or("contact");

    raw.parse::<ScrapeMode>().map_err(|e| match e {
        ProspectError::InvalidRequest(message) => ApiError::BadRequest(message),
        other => ApiError::BadRequest(other.to_string()),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(rename = "browserReady")]
    browser_ready: bool,
    modes: Vec<&'static str>,
}

/// The browser session is established before the listener binds, so a
/// serving process implies a ready rendering engine.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        browser_ready: true,
        modes: ScrapeMode::SUPPORTED.iter().map(|m| m.as_str()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls_must_be_present_and_non_empty() {
        assert!(parse_urls(&json!({})).is_err());
        assert!(parse_urls(&json!({ "urls": "https://a.example" })).is_err());
        assert!(parse_urls(&json!({ "urls": [] })).is_err());
        assert!(parse_urls(&json!({ "urls": [42] })).is_err());

        let urls = parse_urls(&json!({ "urls": ["https://a.example"] })).unwrap();
        assert_eq!(urls, vec!["https://a.example".to_string()]);
    }

    #[test]
    fn mode_defaults_to_contact_and_rejects_unknown_values() {
        let empty = HeaderMap::new();
        assert_eq!(parse_mode(&empty).unwrap(), ScrapeMode::Contact);

        let mut headers = HeaderMap::new();
        headers.insert("x-mode", "content".parse().unwrap());
        assert_eq!(parse_mode(&headers).unwrap(), ScrapeMode::Content);

        let mut headers = HeaderMap::new();
        headers.insert("mode", "content".parse().unwrap());
        assert_eq!(parse_mode(&headers).unwrap(), ScrapeMode::Content);

        let mut headers = HeaderMap::new();
        headers.insert("x-mode", "turbo".parse().unwrap());
        assert!(parse_mode(&headers).is_err());
    }
}

use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. The service has no backing store, so this only proves the
/// process is accepting requests.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

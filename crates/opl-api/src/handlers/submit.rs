use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use opl_core::{AppError, Submission};
use serde_json::json;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Accept a lesson submission, render its report and email it to the submitter.
///
/// Responds only after the email has been handed to the SMTP server (or has
/// failed), so a 200 means the report was sent.
#[tracing::instrument(skip_all, fields(operation = "submit_report"))]
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    ValidatedJson(submission): ValidatedJson<Submission>,
) -> Result<impl IntoResponse, HttpAppError> {
    let outcome = state
        .pipeline
        .process(&submission)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        request_id = %outcome.request_id,
        pages = outcome.page_count,
        images = outcome.images_embedded,
        retained = outcome.retained_path.is_some(),
        "Report submitted"
    );

    Ok(Json(json!({ "status": "success" })))
}

//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` renders as a JSON body of the form
//! `{"status": "error", "message": ..., "code": ...}` with the status code
//! taken from `ErrorMetadata`. Bodies leave without `details`;
//! `expose_error_details` adds them back when the configured environment is
//! not production.

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opl_core::{AppError, ErrorMetadata, LogLevel};
use serde::{de::DeserializeOwned, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: &'static str,
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether submitting again may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, include_details: bool) -> Self {
        Self {
            status: "error",
            message: error.client_message(),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
            details: include_details.then(|| error.detailed_message()),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<opl_services::PipelineError> for HttpAppError {
    fn from(err: opl_services::PipelineError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body rejections into a 400 (or 413) with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(
                "Request body is too large".to_string(),
            ));
        }
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies with our ErrorResponse format.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Error body with `details` filled in, parked on the response for
/// `expose_error_details`. Never attached for sensitive errors.
#[derive(Debug, Clone)]
struct DetailedErrorBody(ErrorResponse);

/// Response layer: outside production, swap error bodies for their detailed form.
pub async fn expose_error_details(
    State(state): State<Arc<AppState>>,
    mut response: Response,
) -> Response {
    let Some(DetailedErrorBody(body)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };
    if state.config.is_production() {
        return response;
    }

    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Json(body).into_response().into_body())
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, false);
        let mut response = (status, Json(body)).into_response();
        if !app_error.is_sensitive() {
            response
                .extensions_mut()
                .insert(DetailedErrorBody(ErrorResponse::from_app_error(app_error, true)));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opl_services::{NotifyError, PipelineError};

    #[test]
    fn invalid_email_body_shape() {
        let body = ErrorResponse::from_app_error(&AppError::InvalidEmail, false);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "Invalid email address");
        assert_eq!(value["code"], "INVALID_EMAIL");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn delivery_failure_maps_to_bad_gateway() {
        let HttpAppError(err) =
            PipelineError::Delivery(NotifyError::ContentType("x".to_string())).into();
        assert_eq!(err.http_status_code(), 502);

        let response = HttpAppError(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_email_maps_to_bad_request() {
        let response = HttpAppError::from(PipelineError::InvalidEmail).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sensitive_errors_never_carry_details() {
        let response =
            HttpAppError(AppError::Rendering("lopdf: invalid xref".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<DetailedErrorBody>().is_none());
    }

    #[test]
    fn input_errors_park_details_for_the_response_layer() {
        let response =
            HttpAppError(AppError::InvalidInput("expected value at line 1".to_string()))
                .into_response();
        let DetailedErrorBody(body) = response.extensions().get::<DetailedErrorBody>().unwrap();
        assert_eq!(body.code, "INVALID_INPUT");
        assert!(body.details.as_deref().unwrap().contains("expected value"));
    }
}

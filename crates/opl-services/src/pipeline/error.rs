use opl_core::AppError;
use opl_processing::ReportError;
use thiserror::Error;

use crate::services::notify::NotifyError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Failed to prepare request workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Report rendering failed: {0}")]
    Rendering(#[from] ReportError),

    #[error("Report rendering task failed: {0}")]
    RenderTask(#[from] tokio::task::JoinError),

    #[error("Report generated but email delivery failed: {0}")]
    Delivery(#[from] NotifyError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidEmail => AppError::InvalidEmail,
            PipelineError::Workspace(e) => AppError::InternalWithSource {
                message: "Failed to prepare request workspace".to_string(),
                source: e.into(),
            },
            PipelineError::Rendering(e) => AppError::Rendering(e.to_string()),
            PipelineError::RenderTask(e) => AppError::Rendering(e.to_string()),
            PipelineError::Delivery(e) => AppError::EmailDelivery(e.to_string()),
        }
    }
}

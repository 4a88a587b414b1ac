//! Request-to-artifact pipeline
//!
//! validate -> open workspace -> fetch images -> render -> send -> (retain) -> cleanup

mod error;
mod service;

pub use error::PipelineError;
pub use service::{ReportPipeline, SubmissionOutcome};

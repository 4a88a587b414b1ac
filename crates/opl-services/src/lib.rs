//! OPL Services Layer
//!
//! Hosts the request-to-artifact pipeline and the outbound services it
//! drives: image downloads over HTTP and report delivery over SMTP. The API
//! crate only parses requests and maps `PipelineError` to responses.

pub mod pipeline;
pub mod retry;
pub mod services;
pub mod workspace;

pub use pipeline::{PipelineError, ReportPipeline, SubmissionOutcome};
pub use retry::RetryPolicy;
pub use services::fetch::{resolve_direct_link, FetchError, ImageFetcher};
pub use services::notify::{build_report_message, NotifyError, ReportMailer, SmtpNotifier};
pub use workspace::RequestWorkspace;

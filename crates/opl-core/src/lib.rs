//! OPL Core Library
//!
//! This crate provides the domain model, error types, configuration and input
//! validation shared by every OPL report component.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, FetchConfig, MailConfig, ReportConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ImageSlot, ReportField, Submission};
pub use validation::is_valid_email;

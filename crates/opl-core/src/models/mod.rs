//! Domain models

pub mod submission;

pub use submission::{ImageSlot, ReportField, Submission};

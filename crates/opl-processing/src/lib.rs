//! OPL Processing Library
//!
//! Report rendering: lays out a submission and its photographs on A4 pages
//! and writes the result as a PDF.

pub mod error;
pub mod report;

pub use error::ReportError;
pub use report::{
    PreparedImage, RenderReport, RenderedReport, ReportImage, ReportRenderer, ReportStyle,
    REPORT_FILE_NAME,
};

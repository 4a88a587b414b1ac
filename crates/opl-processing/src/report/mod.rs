//! Report rendering
//!
//! `ReportRenderer` turns a `Submission` plus up to two photographs into a
//! fixed-template PDF. Layout follows a simple top-down cursor: a centered
//! title, one labelled block per non-empty field, then the photographs.

pub mod fonts;
pub mod layout;
pub mod photo;
mod renderer;

pub use photo::PreparedImage;
pub use renderer::{
    RenderReport, RenderedReport, ReportImage, ReportRenderer, ReportStyle, REPORT_FILE_NAME,
};

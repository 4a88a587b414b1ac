//! Application state shared by all handlers.

use opl_core::Config;
use opl_services::ReportPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: ReportPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: ReportPipeline) -> Self {
        Self { config, pipeline }
    }
}

//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use opl_core::Config;
use opl_services::{ImageFetcher, ReportPipeline, SmtpNotifier};

use crate::state::AppState;

/// Validate configuration, start telemetry and wire the pipeline into a router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let state = Arc::new(build_state(config)?);
    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}

/// Construct the production pipeline (HTTP image fetcher, SMTP notifier).
pub fn build_state(config: Config) -> Result<AppState> {
    let fetcher = ImageFetcher::new(&config.fetch)?;
    let notifier =
        SmtpNotifier::from_config(&config.mail).context("Failed to configure SMTP transport")?;
    let pipeline = ReportPipeline::new(fetcher, Arc::new(notifier), config.report.clone());

    Ok(AppState::new(config, pipeline))
}

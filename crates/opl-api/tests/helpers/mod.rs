//! Test helpers: build AppState and router with a recording mailer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use opl_api::setup::routes;
use opl_api::state::AppState;
use opl_core::Config;
use opl_processing::RenderReport;
use opl_services::{ImageFetcher, NotifyError, ReportMailer, ReportPipeline};
use tempfile::TempDir;

/// Mailer that keeps every report it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentReport>>,
    pub fail: bool,
}

#[derive(Debug, Clone)]
pub struct SentReport {
    pub to: String,
    pub path: PathBuf,
    pub pdf: Vec<u8>,
}

#[async_trait]
impl ReportMailer for RecordingMailer {
    async fn send_report(&self, to_email: &str, report_path: &Path) -> Result<(), NotifyError> {
        let pdf = std::fs::read(report_path).map_err(|e| NotifyError::ReadReport {
            path: report_path.to_path_buf(),
            source: e,
        })?;
        self.sent.lock().unwrap().push(SentReport {
            to: to_email.to_string(),
            path: report_path.to_path_buf(),
            pdf,
        });
        if self.fail {
            return Err(NotifyError::ContentType("simulated SMTP outage".to_string()));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub mailer: Arc<RecordingMailer>,
    pub work_dir: TempDir,
}

impl TestApp {
    pub fn sent(&self) -> Vec<SentReport> {
        self.mailer.sent.lock().unwrap().clone()
    }

    pub fn work_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.work_dir.path())
            .unwrap()
            .next()
            .is_none()
    }
}

pub fn test_config(work_dir: &Path, overrides: &[(&'static str, &str)]) -> Config {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("EMAIL_FROM", "reports@plant.example.com".to_string()),
        ("EMAIL_PASSWORD", "app-password".to_string()),
        ("WORK_DIR", work_dir.display().to_string()),
        // nothing listens here; image links in tests resolve to failed downloads
        (
            "DIRECT_LINK_TEMPLATE",
            "http://127.0.0.1:9/uc?export=download&id={id}".to_string(),
        ),
        ("FETCH_TIMEOUT_SECS", "2".to_string()),
        ("FETCH_MAX_ATTEMPTS", "1".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(*key, value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn setup_test_app(mailer: RecordingMailer) -> TestApp {
    setup_test_app_with(mailer, None, &[])
}

/// Like `setup_test_app`, with an optional renderer replacement and extra
/// configuration variables.
pub fn setup_test_app_with(
    mailer: RecordingMailer,
    renderer: Option<Arc<dyn RenderReport>>,
    overrides: &[(&'static str, &str)],
) -> TestApp {
    let work_dir = tempfile::tempdir().unwrap();
    let config = test_config(work_dir.path(), overrides);
    let mailer = Arc::new(mailer);

    let mut pipeline = ReportPipeline::new(
        ImageFetcher::new(&config.fetch).unwrap(),
        mailer.clone(),
        config.report.clone(),
    );
    if let Some(renderer) = renderer {
        pipeline = pipeline.with_renderer(renderer);
    }
    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let router = routes::setup_routes(&config, state).unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        mailer,
        work_dir,
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use opl_core::{is_valid_email, ImageSlot, ReportConfig, Submission};
use opl_processing::{RenderReport, RenderedReport, ReportImage, ReportRenderer};
use uuid::Uuid;

use super::PipelineError;
use crate::services::fetch::ImageFetcher;
use crate::services::notify::ReportMailer;
use crate::workspace::RequestWorkspace;

/// What a successful submission produced. The rendered file itself is gone
/// with the workspace; only a retained copy outlives the request.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub request_id: Uuid,
    pub page_count: usize,
    /// Bold headings in drawing order (field labels, then image labels).
    pub headings: Vec<String>,
    pub images_embedded: usize,
    /// Copy of the report kept after cleanup, when retention is configured.
    pub retained_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct ReportPipeline {
    fetcher: ImageFetcher,
    renderer: Arc<dyn RenderReport>,
    mailer: Arc<dyn ReportMailer>,
    config: ReportConfig,
}

impl ReportPipeline {
    pub fn new(fetcher: ImageFetcher, mailer: Arc<dyn ReportMailer>, config: ReportConfig) -> Self {
        Self {
            fetcher,
            renderer: Arc::new(ReportRenderer::default()),
            mailer,
            config,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn RenderReport>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Download the before/after images into the workspace. Slots whose
    /// download fails are left out.
    pub async fn fetch_images(
        &self,
        submission: &Submission,
        workspace: &RequestWorkspace,
    ) -> Vec<ReportImage> {
        let mut images = Vec::with_capacity(ImageSlot::ALL.len());
        for slot in ImageSlot::ALL {
            let dest = workspace.image_path(slot);
            let source_url = slot.source_url(submission);
            if let Some(path) = self.fetcher.download_image(source_url, &dest).await {
                images.push(ReportImage {
                    slot,
                    path,
                    source_url: source_url.unwrap_or_default().trim().to_string(),
                });
            }
        }
        images
    }

    /// Fetch the images and render `opl_report.pdf` inside the workspace.
    pub async fn render_report(
        &self,
        submission: &Submission,
        workspace: &RequestWorkspace,
    ) -> Result<RenderedReport, PipelineError> {
        let images = self.fetch_images(submission, workspace).await;

        let renderer = Arc::clone(&self.renderer);
        let submission = submission.clone();
        let dir = workspace.path().to_path_buf();
        let report =
            tokio::task::spawn_blocking(move || renderer.render(&submission, &images, &dir))
                .await??;

        Ok(report)
    }

    /// Run one submission end to end. The workspace, and everything in it, is
    /// gone by the time this returns.
    pub async fn process(&self, submission: &Submission) -> Result<SubmissionOutcome, PipelineError> {
        let email = submission.email();
        if !is_valid_email(email) {
            tracing::debug!(email = %email, "Rejected submission with invalid email");
            return Err(PipelineError::InvalidEmail);
        }

        let request_id = Uuid::new_v4();
        let workspace = RequestWorkspace::create(self.config.work_dir.as_deref(), request_id)
            .map_err(PipelineError::Workspace)?;

        let report = self.render_report(submission, &workspace).await.map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Report rendering failed");
            e
        })?;

        if let Err(e) = self.mailer.send_report(email, &report.path).await {
            tracing::error!(
                request_id = %request_id,
                to = %email,
                error = %e,
                "Report generated but email delivery failed"
            );
            return Err(e.into());
        }

        let retained_path = match &self.config.retain_dir {
            Some(dir) => match workspace.retain_report(dir).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(
                        request_id = %request_id,
                        retain_dir = %dir.display(),
                        error = %e,
                        "Failed to retain report copy"
                    );
                    None
                }
            },
            None => None,
        };

        tracing::info!(
            request_id = %request_id,
            to = %email,
            pages = report.page_count,
            images = report.images_embedded,
            "Submission processed"
        );

        if let Err(e) = workspace.close() {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to remove request workspace");
        }

        Ok(SubmissionOutcome {
            request_id,
            page_count: report.page_count,
            headings: report.headings,
            images_embedded: report.images_embedded,
            retained_path,
        })
    }
}

//! Per-request scratch directory
//!
//! Every submission gets its own directory named after its request id. The
//! downloaded images and the rendered report live there, and the directory is
//! removed when the `RequestWorkspace` is dropped, whichever way the request
//! ends.

use std::io;
use std::path::{Path, PathBuf};

use opl_core::ImageSlot;
use opl_processing::REPORT_FILE_NAME;
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug)]
pub struct RequestWorkspace {
    request_id: Uuid,
    dir: TempDir,
}

impl RequestWorkspace {
    /// Create `opl-<request_id>` under `parent`, or under the system temp dir.
    pub fn create(parent: Option<&Path>, request_id: Uuid) -> io::Result<Self> {
        let prefix = format!("opl-{}", request_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).rand_bytes(0);

        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        tracing::debug!(
            request_id = %request_id,
            path = %dir.path().display(),
            "Request workspace created"
        );

        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn image_path(&self, slot: ImageSlot) -> PathBuf {
        self.dir.path().join(slot.file_name())
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.path().join(REPORT_FILE_NAME)
    }

    /// Copy the rendered report to `<retain_dir>/opl_report-<request_id>.pdf`.
    pub async fn retain_report(&self, retain_dir: &Path) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(retain_dir).await?;
        let target = retain_dir.join(format!("opl_report-{}.pdf", self.request_id));
        tokio::fs::copy(self.report_path(), &target).await?;
        Ok(target)
    }

    /// Remove the directory now, surfacing any error instead of ignoring it on drop.
    pub fn close(self) -> io::Result<()> {
        let request_id = self.request_id;
        self.dir.close()?;
        tracing::debug!(request_id = %request_id, "Request workspace removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_named_after_request_and_removed_on_drop() {
        let parent = TempDir::new().unwrap();
        let request_id = Uuid::new_v4();

        let workspace = RequestWorkspace::create(Some(parent.path()), request_id).unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("opl-{}", request_id)
        );
        assert_eq!(workspace.image_path(ImageSlot::Before), path.join("before.jpg"));
        assert_eq!(workspace.report_path(), path.join("opl_report.pdf"));

        std::fs::write(workspace.image_path(ImageSlot::After), b"jpeg").unwrap();
        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_requests_get_separate_directories() {
        let parent = TempDir::new().unwrap();
        let a = RequestWorkspace::create(Some(parent.path()), Uuid::new_v4()).unwrap();
        let b = RequestWorkspace::create(Some(parent.path()), Uuid::new_v4()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn creates_missing_parent() {
        let root = TempDir::new().unwrap();
        let parent = root.path().join("work").join("opl");
        let workspace = RequestWorkspace::create(Some(&parent), Uuid::new_v4()).unwrap();
        assert!(workspace.path().starts_with(&parent));
        workspace.close().unwrap();
    }

    #[tokio::test]
    async fn retained_report_outlives_workspace() {
        let root = TempDir::new().unwrap();
        let retain_dir = root.path().join("reports");
        let request_id = Uuid::new_v4();

        let workspace = RequestWorkspace::create(Some(root.path()), request_id).unwrap();
        std::fs::write(workspace.report_path(), b"%PDF-1.5").unwrap();
        let kept = workspace.retain_report(&retain_dir).await.unwrap();
        drop(workspace);

        assert_eq!(kept, retain_dir.join(format!("opl_report-{}.pdf", request_id)));
        assert_eq!(std::fs::read(&kept).unwrap(), b"%PDF-1.5");
    }
}

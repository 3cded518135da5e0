//! Per-request scratch directory.
//!
//! Every request gets its own directory and UUID; candidate names are
//! `<uuid>_<strategy>.pdf`, so concurrent requests never share a path. The
//! directory lives next to the output by default, which keeps the final rename
//! on one filesystem.

use crate::error::CompressError;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::warn;
use uuid::Uuid;

pub struct WorkArea {
    request_id: Uuid,
    dir: TempDir,
}

impl WorkArea {
    /// Create the work directory under `parent`, or next to `output` when `parent` is None.
    ///
    /// The base is canonicalized, so every path handed out is absolute and
    /// stays valid whatever working directory a tool is started in.
    pub async fn create(output: &Path, parent: Option<&Path>) -> Result<Self, CompressError> {
        let base = match parent {
            Some(dir) => dir.to_path_buf(),
            None => output_parent(output),
        };
        let work_area_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| CompressError::WorkArea { path, source }
        };

        tokio::fs::create_dir_all(&base).await.map_err(work_area_err(&base))?;
        let base = tokio::fs::canonicalize(&base).await.map_err(work_area_err(&base))?;

        let request_id = Uuid::new_v4();
        let prefix = format!(".pdfopt-{}-", request_id.simple());
        let tempdir_base = base.clone();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(&prefix).tempdir_in(&tempdir_base)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        .and_then(|created| created)
        .map_err(work_area_err(&base))?;

        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Candidate file for one strategy of this request
    pub fn candidate_path(&self, strategy: &str) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}_{}.pdf", self.request_id.simple(), strategy))
    }

    /// Where the original is staged before it is renamed onto the output.
    ///
    /// Lies outside the `<uuid>_<strategy>.pdf` scheme, so no strategy name can clash with it.
    pub fn staging_path(&self) -> PathBuf {
        self.dir.path().join(format!("{}.original", self.request_id.simple()))
    }

    /// Remove the directory and anything left in it
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove work directory {}: {}", path.display(), e);
        }
    }
}

fn output_parent(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

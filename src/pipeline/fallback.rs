//! Fallback guard: keep the original when no strategy improved on it.
//!
//! The input is copied into the work area first and then renamed onto the
//! output, so the output path is never observed half-written.

use crate::error::CompressError;
use crate::file_manager::FileManager;
use crate::pipeline::work_area::WorkArea;
use std::path::Path;
use tracing::info;

/// Copy `input` verbatim to `output`; returns the number of bytes written
pub async fn preserve_original(input: &Path, output: &Path, work: &WorkArea) -> Result<u64, CompressError> {
    info!("🔁 No strategy beat the original, keeping it unchanged");

    let staged = work.staging_path();
    let finalize_err = |source| CompressError::Finalize { path: output.to_path_buf(), source };

    let copied = FileManager::copy(input, &staged).await.map_err(finalize_err)?;
    FileManager::rename(&staged, output).await.map_err(finalize_err)?;
    Ok(copied)
}

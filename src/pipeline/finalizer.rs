//! Finalizer: publish the winner and compute statistics.

use crate::error::CompressError;
use crate::file_manager::FileManager;
use crate::pipeline::executor::CompressionAttempt;
use std::path::Path;
use tracing::info;

/// Atomically rename the winning candidate onto `output`
pub async fn promote_candidate(attempt: &CompressionAttempt, output: &Path) -> Result<(), CompressError> {
    FileManager::rename(&attempt.candidate, output)
        .await
        .map_err(|source| CompressError::Finalize { path: output.to_path_buf(), source })?;
    info!("💾 {} saved to {}", attempt.strategy, output.display());
    Ok(())
}

/// Percentage reduction rounded to two decimals, clamped to `0.0..=100.0`
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 || compressed_size >= original_size {
        return 0.0;
    }
    let ratio = FileManager::calculate_reduction(original_size, compressed_size);
    ((ratio * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

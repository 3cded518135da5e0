//! Values returned to callers of the pipeline.

use crate::pipeline::executor::{CompressionAttempt, StrategyFailure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Strategy name reported when the original file was kept
pub const NO_STRATEGY: &str = "none";

/// Outcome of one executed strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub strategy: String,
    /// Candidate size in bytes, 0 when the strategy failed
    pub size: u64,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptReport {
    pub fn succeeded(attempt: &CompressionAttempt) -> Self {
        Self {
            strategy: attempt.strategy.to_string(),
            size: attempt.size,
            elapsed_ms: attempt.elapsed.as_millis() as u64,
            error: None,
        }
    }

    pub fn failed(failure: &StrategyFailure) -> Self {
        Self {
            strategy: failure.strategy.to_string(),
            size: 0,
            elapsed_ms: failure.elapsed.as_millis() as u64,
            error: Some(failure.source.to_string()),
        }
    }
}

/// Final, immutable result of a compression request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionResult {
    pub success: bool,
    pub output_path: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Percentage reduction, 0..=100
    pub compression_ratio: f64,
    /// Winning strategy, or [`NO_STRATEGY`]
    pub strategy: String,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptReport>,
}

impl CompressionResult {
    /// A request that failed outright; nothing was written to `output_path`
    pub fn failed(output_path: &Path, original_size: u64, error: impl ToString) -> Self {
        Self {
            success: false,
            output_path: output_path.to_path_buf(),
            original_size,
            compressed_size: 0,
            compression_ratio: 0.0,
            strategy: NO_STRATEGY.to_string(),
            error: Some(error.to_string()),
            attempts: Vec::new(),
        }
    }

    /// Whether the original file was kept because nothing beat it
    pub fn is_fallback(&self) -> bool {
        self.success && self.strategy == NO_STRATEGY
    }

    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.compressed_size)
    }
}

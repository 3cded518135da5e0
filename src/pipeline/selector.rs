//! # Best Result Selector
//!
//! Folds attempt outcomes into a single winner. The selection is seeded with
//! the original file, so a candidate only wins when it is strictly smaller than
//! everything seen so far (original included). Equal sizes keep the earlier
//! winner, which makes catalog order the tie-break.
//!
//! This is the only place candidate files are deleted:
//! - a rejected or failed candidate is deleted immediately
//! - a superseded best is deleted when the new best is adopted
//! - the original input is never deleted

use crate::file_manager::FileManager;
use crate::pipeline::executor::{AttemptOutcome, CompressionAttempt};
use crate::pipeline::result::AttemptReport;
use std::path::Path;
use tracing::{debug, info, warn};

/// Current winner of the fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Best {
    /// Nothing has beaten the input yet
    Original { size: u64 },
    Candidate(CompressionAttempt),
}

impl Best {
    pub fn size(&self) -> u64 {
        match self {
            Best::Original { size } => *size,
            Best::Candidate(attempt) => attempt.size,
        }
    }
}

/// Replacement rule: strictly smaller and non-empty
pub fn improves(candidate_size: u64, best_size: u64) -> bool {
    candidate_size > 0 && candidate_size < best_size
}

/// Immutable state of the fold
#[derive(Debug)]
pub struct Selection {
    best: Best,
    reports: Vec<AttemptReport>,
}

impl Selection {
    /// Start from the original file at its real size
    pub fn seeded(original_size: u64) -> Self {
        Self {
            best: Best::Original { size: original_size },
            reports: Vec::new(),
        }
    }

    pub fn best(&self) -> &Best {
        &self.best
    }

    pub fn reports(&self) -> &[AttemptReport] {
        &self.reports
    }

    pub fn into_parts(self) -> (Best, Vec<AttemptReport>) {
        (self.best, self.reports)
    }

    /// Fold one outcome into the selection
    pub async fn consider(self, outcome: AttemptOutcome) -> Self {
        let Selection { best, mut reports } = self;

        match outcome {
            Err(failure) => {
                warn!("⚠️ {}", failure);
                reports.push(AttemptReport::failed(&failure));
                discard(&failure.candidate).await;
                Selection { best, reports }
            }
            Ok(attempt) if improves(attempt.size, best.size()) => {
                info!(
                    "🏆 {} is the new best: {} (was {})",
                    attempt.strategy,
                    FileManager::format_size(attempt.size),
                    FileManager::format_size(best.size())
                );
                reports.push(AttemptReport::succeeded(&attempt));
                if let Best::Candidate(previous) = best {
                    discard(&previous.candidate).await;
                }
                Selection { best: Best::Candidate(attempt), reports }
            }
            Ok(attempt) => {
                debug!(
                    "{} produced {} bytes, not better than {} bytes",
                    attempt.strategy,
                    attempt.size,
                    best.size()
                );
                reports.push(AttemptReport::succeeded(&attempt));
                discard(&attempt.candidate).await;
                Selection { best, reports }
            }
        }
    }
}

/// Delete a candidate; failures are logged, the work area removes leftovers later
async fn discard(candidate: &Path) {
    if let Err(e) = FileManager::remove_if_exists(candidate).await {
        warn!("Failed to delete candidate {}: {}", candidate.display(), e);
    }
}

//! # Strategy Executor
//!
//! Runs one strategy against the input and measures the candidate it produced.
//!
//! Failures are data at this layer: a failing strategy yields a
//! [`StrategyFailure`] and the remaining strategies still run. The executor
//! never deletes files; it only reports which candidate path it used so the
//! selector can dispose of it.

use crate::error::StrategyError;
use crate::file_manager::FileManager;
use crate::pipeline::work_area::WorkArea;
use crate::runner::{CommandRunner, ToolInvocation};
use crate::strategy::CompressionStrategy;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A candidate produced by a successful strategy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionAttempt {
    pub strategy: &'static str,
    pub candidate: PathBuf,
    /// Candidate size in bytes, always > 0
    pub size: u64,
    pub elapsed: Duration,
}

/// A strategy run that did not yield a usable candidate
#[derive(Debug, thiserror::Error)]
#[error("strategy {strategy} failed after {elapsed:?}: {source}")]
pub struct StrategyFailure {
    pub strategy: &'static str,
    /// Path the tool was asked to write; may hold a partial file
    pub candidate: PathBuf,
    pub elapsed: Duration,
    #[source]
    pub source: StrategyError,
}

pub type AttemptOutcome = Result<CompressionAttempt, StrategyFailure>;

/// Executes strategies through a [`CommandRunner`] under a fixed timeout
#[derive(Clone)]
pub struct StrategyExecutor {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl StrategyExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Run `strategy` with `program`, writing into the request's work area
    pub async fn execute(
        &self,
        strategy: &CompressionStrategy,
        program: &Path,
        input: &Path,
        work: &WorkArea,
    ) -> AttemptOutcome {
        let candidate = work.candidate_path(strategy.name);
        let invocation = ToolInvocation {
            strategy: strategy.name,
            program: program.to_path_buf(),
            args: strategy.argv(input, &candidate),
            working_dir: work.path().to_path_buf(),
            output: candidate.clone(),
        };

        debug!("Attempting compression with {} ({})", strategy.name, strategy.tool());
        let start_time = Instant::now();
        let result = self.run_and_measure(&invocation).await;
        let elapsed = start_time.elapsed();

        match result {
            Ok(size) => {
                debug!("{} produced {} bytes in {:?}", strategy.name, size, elapsed);
                Ok(CompressionAttempt {
                    strategy: strategy.name,
                    candidate,
                    size,
                    elapsed,
                })
            }
            Err(source) => Err(StrategyFailure {
                strategy: strategy.name,
                candidate,
                elapsed,
                source,
            }),
        }
    }

    async fn run_and_measure(&self, invocation: &ToolInvocation) -> Result<u64, StrategyError> {
        self.runner.run(invocation, self.timeout).await?;

        match FileManager::file_size(&invocation.output).await {
            Ok(0) => Err(StrategyError::EmptyOutput),
            Ok(size) => Ok(size),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StrategyError::MissingOutput),
            Err(e) => Err(StrategyError::Io(e)),
        }
    }
}

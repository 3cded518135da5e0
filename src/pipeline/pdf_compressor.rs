//! # PDF Compressor Orchestrator
//!
//! Drives one compression request through the pipeline:
//!
//! ```text
//! Start -> Probing -> Executing(1..N) -> Fallback? -> Finalize -> Done
//! ```
//!
//! 1. **Validation**: the input must exist, be a regular file and be non-empty.
//!    Nothing else runs otherwise (no probe, no subprocess).
//! 2. **Probing**: tool availability is detected once for this request.
//! 3. **Executing**: every catalog strategy whose tool is available runs in
//!    catalog order, one at a time. Each outcome is folded into the selection.
//! 4. **Fallback**: if nothing beat the original, the input is copied through.
//! 5. **Finalize**: the winner is renamed onto the output path.
//!
//! The per-request work directory is removed before `compress` returns, on
//! success and on failure. If the `compress` future is dropped, running tools
//! are killed (`kill_on_drop`) and the work directory is removed on drop.

use crate::config::Config;
use crate::error::CompressError;
use crate::pipeline::executor::StrategyExecutor;
use crate::pipeline::fallback::preserve_original;
use crate::pipeline::finalizer::{compression_ratio, promote_candidate};
use crate::pipeline::result::{CompressionResult, NO_STRATEGY};
use crate::pipeline::selector::{Best, Selection};
use crate::pipeline::work_area::WorkArea;
use crate::probe::{SystemProber, ToolAvailability, ToolProber};
use crate::runner::{CommandRunner, SystemRunner};
use crate::strategy::{default_catalog, CompressionStrategy};
use crate::tool_resolver::ToolPathResolver;
use crate::file_manager::FileManager;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, field, info, info_span, warn, Instrument, Span};

/// Adaptive PDF compressor: best of several external tools
#[derive(Clone)]
pub struct PdfCompressor {
    config: Config,
    catalog: Vec<CompressionStrategy>,
    prober: Arc<dyn ToolProber>,
    executor: StrategyExecutor,
}

impl PdfCompressor {
    /// Create a compressor that probes and runs real tools
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let resolver = ToolPathResolver::new(config.tools_dir.as_deref());
        let prober = Arc::new(SystemProber::new(resolver, config.probe_timeout()));
        Ok(Self::with_backends(config, prober, Arc::new(SystemRunner)))
    }

    /// Create a compressor with custom tool detection and execution
    pub fn with_backends(config: Config, prober: Arc<dyn ToolProber>, runner: Arc<dyn CommandRunner>) -> Self {
        let executor = StrategyExecutor::new(runner, config.strategy_timeout());
        Self {
            config,
            catalog: default_catalog(),
            prober,
            executor,
        }
    }

    /// Replace the strategy catalog; order is the tie-break
    pub fn with_catalog(mut self, catalog: Vec<CompressionStrategy>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &[CompressionStrategy] {
        &self.catalog
    }

    /// Compress `input` into `output`.
    ///
    /// Never panics and never returns an error: failures are reported through
    /// `success = false` and `error`. The caller keeps ownership of `input`.
    pub async fn compress(&self, input: &Path, output: &Path) -> CompressionResult {
        let span = info_span!("compress", input = %input.display(), request_id = field::Empty);
        self.compress_request(input, output).instrument(span).await
    }

    async fn compress_request(&self, input: &Path, output: &Path) -> CompressionResult {
        let (resolved_input, original_size) = match validate_input(input).await {
            Ok(validated) => validated,
            Err(e) => {
                error!("❌ {}", e);
                return CompressionResult::failed(output, 0, e);
            }
        };
        let input = resolved_input.as_path();

        let work = match WorkArea::create(output, self.config.work_dir.as_deref()).await {
            Ok(work) => work,
            Err(e) => {
                error!("❌ {}", e);
                return CompressionResult::failed(output, original_size, e);
            }
        };
        Span::current().record("request_id", field::display(work.request_id()));
        debug!("Work directory: {}", work.path().display());

        let result = match self.run_strategies(input, output, original_size, &work).await {
            Ok(result) => result,
            Err(e) => {
                error!("❌ Compression of {} failed: {}", input.display(), e);
                CompressionResult::failed(output, original_size, e)
            }
        };

        work.cleanup();
        result
    }

    async fn run_strategies(
        &self,
        input: &Path,
        output: &Path,
        original_size: u64,
        work: &WorkArea,
    ) -> Result<CompressionResult, CompressError> {
        let availability = ToolAvailability::detect(self.prober.as_ref()).await;
        if availability.none_available() {
            warn!("No compression tools available, the original will be kept");
        }

        let runnable: Vec<(&CompressionStrategy, &Path)> = self
            .catalog
            .iter()
            .filter(|strategy| !self.config.is_skipped(strategy.name))
            .filter_map(|strategy| match availability.program(strategy.tool()) {
                Some(program) => Some((strategy, program)),
                None => {
                    debug!("Skipping {}: {} not available", strategy.name, strategy.tool());
                    None
                }
            })
            .collect();

        info!(
            "🎯 Compressing {} ({}) with {} strategies",
            input.display(),
            FileManager::format_size(original_size),
            runnable.len()
        );

        let mut selection = Selection::seeded(original_size);
        for (strategy, program) in runnable {
            let outcome = self.executor.execute(strategy, program, input, work).await;
            selection = selection.consider(outcome).await;
        }
        let (best, attempts) = selection.into_parts();

        let (compressed_size, strategy) = match best {
            Best::Candidate(attempt) => {
                promote_candidate(&attempt, output).await?;
                (attempt.size, attempt.strategy.to_string())
            }
            Best::Original { size } => {
                preserve_original(input, output, work).await?;
                (size, NO_STRATEGY.to_string())
            }
        };

        let compression_ratio = compression_ratio(original_size, compressed_size);
        info!(
            "✅ {} -> {} ({:.2}% saved, strategy: {})",
            FileManager::format_size(original_size),
            FileManager::format_size(compressed_size),
            compression_ratio,
            strategy
        );

        Ok(CompressionResult {
            success: true,
            output_path: output.to_path_buf(),
            original_size,
            compressed_size,
            compression_ratio,
            strategy,
            error: None,
            attempts,
        })
    }
}

/// Absolute path and size of a usable input file.
///
/// Tools run inside the work directory, so they must never see a relative input.
async fn validate_input(input: &Path) -> Result<(PathBuf, u64), CompressError> {
    let metadata = tokio::fs::metadata(input)
        .await
        .map_err(|e| CompressError::InvalidInput(format!("cannot read {}: {}", input.display(), e)))?;

    if !metadata.is_file() {
        return Err(CompressError::InvalidInput(format!("not a regular file: {}", input.display())));
    }
    if metadata.len() == 0 {
        return Err(CompressError::InvalidInput(format!("input file is empty: {}", input.display())));
    }
    let absolute = tokio::fs::canonicalize(input)
        .await
        .map_err(|e| CompressError::InvalidInput(format!("cannot resolve {}: {}", input.display(), e)))?;
    Ok((absolute, metadata.len()))
}

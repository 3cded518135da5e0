//! # Batch Compressor
//!
//! Comprime tutti i PDF di una directory, rispecchiando la struttura
//! delle sottodirectory nella directory di output.
//!
//! Ogni file è una richiesta indipendente con la propria work area; il numero
//! di richieste concorrenti è limitato da `Config::workers`.

use crate::{
    config::Config,
    file_manager::FileManager,
    json_output::{JsonConfig, JsonMessage},
    pipeline::{CompressionResult, PdfCompressor},
    progress::{OptimizationStats, ProgressManager},
};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// Compresses every PDF below a directory
pub struct BatchCompressor {
    compressor: PdfCompressor,
}

impl BatchCompressor {
    pub fn new(compressor: PdfCompressor) -> Self {
        Self { compressor }
    }

    fn config(&self) -> &Config {
        self.compressor.config()
    }

    /// Compress `input_dir` into `output_dir`, returning aggregate statistics
    pub async fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<OptimizationStats> {
        let start_time = Instant::now();
        let json = self.config().json_output;

        if !input_dir.is_dir() {
            anyhow::bail!("Input directory does not exist: {}", input_dir.display());
        }
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let files = FileManager::find_pdf_files(input_dir)?;
        if !json {
            info!("📂 Found {} PDF files in {}", files.len(), input_dir.display());
        }

        let progress = if json {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(files.len() as u64)
        };

        let semaphore = Arc::new(Semaphore::new(self.config().workers));
        let mut tasks = Vec::with_capacity(files.len());

        for input in files {
            let output = mirrored_output_path(&input, input_dir, output_dir)?;
            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let compressor = self.compressor.clone();
            let semaphore = semaphore.clone();
            let progress = progress.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();

                if json {
                    JsonMessage::start(input.clone(), output.clone(), JsonConfig::from(compressor.config())).emit();
                }
                let result = compressor.compress(&input, &output).await;
                if json {
                    for message in JsonMessage::for_result(input.clone(), &result) {
                        message.emit();
                    }
                }

                progress.update(&completion_message(&input, &result));
                result
            }));
        }

        let mut stats = OptimizationStats::new();
        for joined in join_all(tasks).await {
            match joined {
                Ok(result) => stats.add_result(&result),
                Err(e) => {
                    error!("Compression task failed: {}", e);
                    stats.files_processed += 1;
                    stats.errors += 1;
                }
            }
        }

        let duration = start_time.elapsed().as_secs_f64();
        progress.finish(&stats.format_summary());
        if json {
            JsonMessage::batch_complete(&stats, duration).emit();
        } else {
            info!("🏁 {} in {:.1}s", stats.format_summary(), duration);
        }

        Ok(stats)
    }
}

/// `<output_dir>/<path of input relative to input_dir>`
pub fn mirrored_output_path(input: &Path, input_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
    let relative = input
        .strip_prefix(input_dir)
        .with_context(|| format!("{} is not inside {}", input.display(), input_dir.display()))?;
    Ok(output_dir.join(relative))
}

fn completion_message(input: &Path, result: &CompressionResult) -> String {
    let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if !result.success {
        format!("❌ {}", name)
    } else if result.is_fallback() {
        format!("⏭️ {}: unchanged", name)
    } else {
        format!("✅ {}: {:.2}% saved", name, result.compression_ratio)
    }
}

//! # PDF Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione e override da CLI
//! - Avvio della compressione singola, batch, o del report dei tool
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` ha precedenza)
//! 3. Carica il file di configurazione e applica gli override
//! 4. Esegue il sottocomando
//!
//! ## Esempio di utilizzo:
//! ```bash
//! pdf-optimizer compress report.pdf report.min.pdf --timeout 120
//! pdf-optimizer batch ./scans ./scans-min --skip gs_screen --json
//! pdf-optimizer tools
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pdf_optimizer::{
    file_manager::FileManager,
    json_output::{JsonConfig, JsonMessage},
    progress::ProgressManager,
    BatchCompressor, CompressionResult, Config, PdfCompressor, ToolPathResolver,
};

#[derive(Parser)]
#[command(name = "pdf-optimizer")]
#[command(about = "Compress PDFs by trying several tools and keeping the smallest result")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-strategy timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Directory searched for qpdf/Ghostscript before the PATH
    #[arg(long, global = true)]
    tools_dir: Option<PathBuf>,

    /// Disable a catalog strategy (repeatable)
    #[arg(long = "skip", global = true)]
    skip: Vec<String>,

    /// Output progress and results as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a single PDF
    Compress {
        input: PathBuf,
        output: PathBuf,
    },
    /// Compress every PDF below a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Number of files compressed in parallel
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Show which tools were found
    Tools,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);

    match args.command {
        Command::Compress { input, output } => {
            let compressor = PdfCompressor::new(config)?;
            let json = compressor.config().json_output;

            let result = if json {
                JsonMessage::start(input.clone(), output.clone(), JsonConfig::from(compressor.config())).emit();
                let result = compressor.compress(&input, &output).await;
                for message in JsonMessage::for_result(input.clone(), &result) {
                    message.emit();
                }
                result
            } else {
                let spinner = ProgressManager::spinner(&format!("Compressing {}", input.display()));
                let result = compressor.compress(&input, &output).await;
                spinner.finish_and_clear();
                print_summary(&result);
                result
            };

            Ok(if result.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Batch { input_dir, output_dir, workers } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            let json = config.json_output;
            let batch = BatchCompressor::new(PdfCompressor::new(config)?);

            match batch.run(&input_dir, &output_dir).await {
                Ok(stats) => Ok(if stats.errors == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }),
                Err(e) if json => {
                    JsonMessage::error(e.to_string(), e.chain().nth(1).map(|s| s.to_string())).emit();
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e),
            }
        }
        Command::Tools => {
            let resolver = ToolPathResolver::new(config.tools_dir.as_deref());
            println!("{}", resolver.get_tools_report());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(timeout) = args.timeout {
        config.strategy_timeout_secs = timeout;
    }
    if let Some(ref dir) = args.tools_dir {
        config.tools_dir = Some(dir.clone());
    }
    config.skip_strategies.extend(args.skip.iter().cloned());
    config.json_output |= args.json;
}

fn print_summary(result: &CompressionResult) {
    if !result.success {
        eprintln!("❌ {}", result.error.as_deref().unwrap_or("compression failed"));
        return;
    }

    info!("Output: {}", result.output_path.display());
    println!(
        "{} -> {} ({:.2}% saved, strategy: {})",
        FileManager::format_size(result.original_size),
        FileManager::format_size(result.compressed_size),
        result.compression_ratio,
        result.strategy
    );
    for attempt in &result.attempts {
        match &attempt.error {
            Some(error) => println!("  • {:<16} failed after {} ms: {}", attempt.strategy, attempt.elapsed_ms, error),
            None => println!(
                "  • {:<16} {} in {} ms",
                attempt.strategy,
                FileManager::format_size(attempt.size),
                attempt.elapsed_ms
            ),
        }
    }
}

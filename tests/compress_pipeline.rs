//! Compression Pipeline Integration Tests
//!
//! These tests drive `PdfCompressor` end to end with scripted tools:
//! - Winner selection and tie-breaking
//! - Fallback to the original when nothing is smaller
//! - Failing, timed-out and silent strategies
//! - Work directory cleanup on every path, including a dropped request
//! - Batch mode over a directory tree

use async_trait::async_trait;
use pdf_optimizer::strategy::{CompressionStrategy, PdfSettings, StrategyParams};
use pdf_optimizer::{
    BatchCompressor, CommandRunner, CompressionResult, Config, ExitReport, PdfCompressor, StrategyError,
    ToolFamily, ToolInvocation, ToolProber, NO_STRATEGY,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::assert_ok;

/// Reports a fixed set of tool families as installed
struct FakeProber {
    qpdf: bool,
    ghostscript: bool,
    probes: AtomicUsize,
}

impl FakeProber {
    fn new(qpdf: bool, ghostscript: bool) -> Arc<Self> {
        Arc::new(Self { qpdf, ghostscript, probes: AtomicUsize::new(0) })
    }

    fn all() -> Arc<Self> {
        Self::new(true, true)
    }
}

#[async_trait]
impl ToolProber for FakeProber {
    async fn probe(&self, tool: ToolFamily) -> Option<PathBuf> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match tool {
            ToolFamily::GeneralizedFilter if self.qpdf => Some(PathBuf::from("qpdf")),
            ToolFamily::Rasterizer if self.ghostscript => Some(PathBuf::from("gs")),
            _ => None,
        }
    }
}

/// What a scripted strategy does when invoked
#[derive(Clone, Copy)]
enum Script {
    /// Exit 0 after writing this many bytes
    Write(usize),
    /// Exit 1
    Fail,
    /// Exceed the timeout
    Hang,
    /// Exit 0 without writing anything
    Silent,
    /// Write a partial file, then never finish
    Stall,
}

struct ScriptedRunner {
    scripts: HashMap<&'static str, Script>,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedRunner {
    fn new(scripts: &[(&'static str, Script)]) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every strategy writes `size` bytes
    fn uniform(size: usize) -> Arc<Self> {
        Self::new(&[
            ("qpdf_aggressive", Script::Write(size)),
            ("gs_screen", Script::Write(size)),
            ("gs_ebook", Script::Write(size)),
            ("gs_printer", Script::Write(size)),
            ("gs_prepress", Script::Write(size)),
            ("qpdf_linearize", Script::Write(size)),
        ])
    }

    fn invoked(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|c| c.strategy).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &ToolInvocation, timeout: Duration) -> Result<ExitReport, StrategyError> {
        self.calls.lock().unwrap().push(invocation.clone());

        match self.scripts.get(invocation.strategy).copied().unwrap_or(Script::Silent) {
            Script::Write(size) => {
                tokio::fs::write(&invocation.output, vec![b'x'; size]).await?;
                Ok(ExitReport::default())
            }
            Script::Fail => Err(StrategyError::ExitStatus { code: Some(1), stderr: "boom".to_string() }),
            Script::Hang => Err(StrategyError::TimedOut { seconds: timeout.as_secs() }),
            Script::Silent => Ok(ExitReport::default()),
            Script::Stall => {
                tokio::fs::write(&invocation.output, b"%PDF-1.").await?;
                std::future::pending().await
            }
        }
    }
}

fn compressor(prober: Arc<FakeProber>, runner: Arc<ScriptedRunner>) -> PdfCompressor {
    PdfCompressor::with_backends(Config::default(), prober, runner)
}

async fn write_input(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, vec![b'p'; size]).await.unwrap();
    path
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_smallest_candidate_wins() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 10_000_000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[
        ("qpdf_aggressive", Script::Write(4_000_000)),
        ("gs_screen", Script::Write(4_500_000)),
        ("gs_ebook", Script::Write(5_000_000)),
        ("gs_printer", Script::Write(9_000_000)),
        ("gs_prepress", Script::Write(9_500_000)),
        ("qpdf_linearize", Script::Write(10_100_000)),
    ]);
    let result = compressor(FakeProber::all(), runner.clone()).compress(&input, &output).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.strategy, "qpdf_aggressive");
    assert_eq!(result.original_size, 10_000_000);
    assert_eq!(result.compressed_size, 4_000_000);
    assert_eq!(result.compression_ratio, 60.0);
    assert_eq!(result.output_path, output);
    assert_eq!(std::fs::metadata(&output).unwrap().len(), 4_000_000);
    assert_eq!(result.attempts.len(), 6);
    assert_eq!(
        runner.invoked(),
        vec!["qpdf_aggressive", "gs_screen", "gs_ebook", "gs_printer", "gs_prepress", "qpdf_linearize"]
    );

    // caller keeps the input untouched
    assert_eq!(std::fs::metadata(&input).unwrap().len(), 10_000_000);
}

#[tokio::test]
async fn test_original_kept_when_nothing_is_smaller() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "tiny.pdf", 500).await;
    let output = dir.path().join("tiny.out.pdf");

    let result = compressor(FakeProber::all(), ScriptedRunner::uniform(800))
        .compress(&input, &output)
        .await;

    assert!(result.success);
    assert_eq!(result.strategy, NO_STRATEGY);
    assert_eq!(result.compressed_size, 500);
    assert_eq!(result.compression_ratio, 0.0);
    assert!(result.is_fallback());
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[tokio::test]
async fn test_equal_size_does_not_replace_original() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let result = compressor(FakeProber::all(), ScriptedRunner::uniform(1000))
        .compress(&input, &output)
        .await;

    assert_eq!(result.strategy, NO_STRATEGY);
    assert_eq!(std::fs::read(&output).unwrap(), vec![b'p'; 1000]);
}

#[tokio::test]
async fn test_tie_goes_to_earlier_strategy() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[
        ("qpdf_aggressive", Script::Write(400)),
        ("gs_screen", Script::Write(300)),
        ("gs_ebook", Script::Write(300)),
        ("gs_printer", Script::Write(300)),
    ]);
    let result = compressor(FakeProber::all(), runner).compress(&input, &output).await;

    assert_eq!(result.strategy, "gs_screen");
    assert_eq!(result.compressed_size, 300);
}

#[tokio::test]
async fn test_missing_input_runs_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.pdf");
    let output = dir.path().join("out.pdf");

    let prober = FakeProber::all();
    let runner = ScriptedRunner::uniform(10);
    let result = compressor(prober.clone(), runner.clone()).compress(&input, &output).await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert_eq!(result.strategy, NO_STRATEGY);
    assert!(runner.invoked().is_empty());
    assert_eq!(prober.probes.load(Ordering::SeqCst), 0);
    assert!(!output.exists());
    assert!(entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "empty.pdf", 0).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::uniform(10);
    let result = compressor(FakeProber::all(), runner.clone()).compress(&input, &output).await;

    assert!(!result.success);
    assert!(runner.invoked().is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_no_tools_copies_original() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 2048).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::uniform(10);
    let result = compressor(FakeProber::new(false, false), runner.clone())
        .compress(&input, &output)
        .await;

    assert!(result.success);
    assert_eq!(result.strategy, NO_STRATEGY);
    assert!(result.attempts.is_empty());
    assert!(runner.invoked().is_empty());
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[tokio::test]
async fn test_only_available_family_runs() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::uniform(900);
    let result = compressor(FakeProber::new(false, true), runner.clone())
        .compress(&input, &output)
        .await;

    assert_eq!(runner.invoked(), vec!["gs_screen", "gs_ebook", "gs_printer", "gs_prepress"]);
    assert_eq!(result.strategy, "gs_screen");
}

#[tokio::test]
async fn test_failing_strategies_are_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[
        ("qpdf_aggressive", Script::Fail),
        ("gs_screen", Script::Hang),
        ("gs_ebook", Script::Silent),
        ("gs_printer", Script::Write(700)),
        ("gs_prepress", Script::Write(0)),
        ("qpdf_linearize", Script::Write(1200)),
    ]);
    let result = compressor(FakeProber::all(), runner).compress(&input, &output).await;

    assert!(result.success);
    assert_eq!(result.strategy, "gs_printer");
    assert_eq!(result.compression_ratio, 30.0);

    let failed: Vec<&str> = result
        .attempts
        .iter()
        .filter(|a| a.error.is_some())
        .map(|a| a.strategy.as_str())
        .collect();
    assert_eq!(failed, vec!["qpdf_aggressive", "gs_screen", "gs_ebook", "gs_prepress"]);
    assert!(result.attempts.iter().filter(|a| a.error.is_some()).all(|a| a.size == 0));
}

#[tokio::test]
async fn test_all_strategies_failing_falls_back() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[
        ("qpdf_aggressive", Script::Fail),
        ("gs_screen", Script::Fail),
        ("gs_ebook", Script::Hang),
        ("gs_printer", Script::Hang),
        ("gs_prepress", Script::Silent),
        ("qpdf_linearize", Script::Fail),
    ]);
    let result = compressor(FakeProber::all(), runner).compress(&input, &output).await;

    assert!(result.success);
    assert!(result.is_fallback());
    assert_eq!(result.attempts.len(), 6);
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[tokio::test]
async fn test_work_directory_is_removed() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[
        ("qpdf_aggressive", Script::Write(600)),
        ("gs_screen", Script::Write(500)),
        ("gs_ebook", Script::Fail),
        ("gs_printer", Script::Write(800)),
    ]);
    compressor(FakeProber::all(), runner.clone()).compress(&input, &output).await;

    assert_eq!(entries(dir.path()), vec!["in.pdf".to_string(), "out.pdf".to_string()]);

    // candidates were written inside a request work directory next to the output
    for call in runner.calls.lock().unwrap().iter() {
        assert_eq!(call.output.parent(), Some(call.working_dir.as_path()));
        assert_eq!(call.working_dir.parent(), Some(dir.path().canonicalize().unwrap().as_path()));
    }
}

#[tokio::test]
async fn test_skipped_strategies_do_not_run() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let config = Config {
        skip_strategies: vec!["qpdf_aggressive".to_string(), "gs_screen".to_string()],
        ..Default::default()
    };
    let runner = ScriptedRunner::uniform(100);
    let result = PdfCompressor::with_backends(config, FakeProber::all(), runner.clone())
        .compress(&input, &output)
        .await;

    assert!(!runner.invoked().contains(&"qpdf_aggressive"));
    assert!(!runner.invoked().contains(&"gs_screen"));
    assert_eq!(result.strategy, "gs_ebook");
}

#[tokio::test]
async fn test_finalize_failure_reports_error_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    // an occupied directory cannot be replaced by a file
    let output = dir.path().join("out.pdf");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("keep"), b"x").unwrap();

    let result = compressor(FakeProber::all(), ScriptedRunner::uniform(100))
        .compress(&input, &output)
        .await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(output.is_dir());
    assert_eq!(entries(dir.path()), vec!["in.pdf".to_string(), "out.pdf".to_string()]);
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let first_output = dir.path().join("first.pdf");
    let second_output = dir.path().join("second.pdf");

    let compressor = compressor(FakeProber::all(), ScriptedRunner::uniform(640));
    let first = compressor.compress(&input, &first_output).await;
    let second = compressor.compress(&input, &second_output).await;

    assert_eq!(first.strategy, second.strategy);
    assert_eq!(first.compressed_size, second.compressed_size);
    assert_eq!(std::fs::read(&first_output).unwrap(), std::fs::read(&second_output).unwrap());
}

#[tokio::test]
async fn test_concurrent_requests_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let compressor = compressor(FakeProber::all(), ScriptedRunner::uniform(300));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let input = write_input(dir.path(), &format!("in{}.pdf", i), 1000).await;
        let output = dir.path().join(format!("out{}.pdf", i));
        let compressor = compressor.clone();
        tasks.push(tokio::spawn(async move { compressor.compress(&input, &output).await }));
    }

    for task in tasks {
        let result: CompressionResult = task.await.unwrap();
        assert!(result.success);
        assert_eq!(result.compressed_size, 300);
    }
    assert_eq!(entries(dir.path()).len(), 16);
}

#[tokio::test]
async fn test_batch_mirrors_directory_tree() {
    let root = TempDir::new().unwrap();
    let input_dir = root.path().join("in");
    let output_dir = root.path().join("out");
    std::fs::create_dir_all(input_dir.join("nested/deeper")).unwrap();

    write_input(&input_dir, "a.pdf", 1000).await;
    write_input(&input_dir.join("nested"), "b.PDF", 1000).await;
    write_input(&input_dir.join("nested/deeper"), "c.pdf", 100).await;
    write_input(&input_dir.join("nested"), "notes.txt", 1000).await;

    let config = Config { workers: 2, ..Default::default() };
    let batch = BatchCompressor::new(PdfCompressor::with_backends(
        config,
        FakeProber::all(),
        ScriptedRunner::uniform(500),
    ));
    let stats = assert_ok!(batch.run(&input_dir, &output_dir).await);

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.files_compressed, 2);
    assert_eq!(stats.files_unchanged, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.total_bytes_saved, 1000);

    assert_eq!(std::fs::metadata(output_dir.join("a.pdf")).unwrap().len(), 500);
    assert_eq!(std::fs::metadata(output_dir.join("nested/b.PDF")).unwrap().len(), 500);
    assert_eq!(std::fs::read(output_dir.join("nested/deeper/c.pdf")).unwrap(), vec![b'p'; 100]);
    assert!(!output_dir.join("nested/notes.txt").exists());
}

#[tokio::test]
async fn test_dropped_request_leaves_no_files() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[("qpdf_aggressive", Script::Stall)]);
    let compressor = compressor(FakeProber::all(), runner.clone());
    let outcome = tokio::time::timeout(Duration::from_millis(100), compressor.compress(&input, &output)).await;

    assert!(outcome.is_err());
    assert_eq!(runner.invoked(), vec!["qpdf_aggressive"]);
    assert!(!output.exists());
    assert_eq!(entries(dir.path()), vec!["in.pdf".to_string()]);
}

fn ghostscript(name: &'static str, settings: PdfSettings) -> CompressionStrategy {
    CompressionStrategy::new(name, StrategyParams::Ghostscript { settings, resolution_dpi: 96 })
}

#[tokio::test]
async fn test_custom_catalog_order_breaks_ties() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let scripts = [("fast", Script::Write(250)), ("slow", Script::Write(250))];

    for (catalog, expected) in [
        (vec![ghostscript("fast", PdfSettings::Screen), ghostscript("slow", PdfSettings::Ebook)], "fast"),
        (vec![ghostscript("slow", PdfSettings::Ebook), ghostscript("fast", PdfSettings::Screen)], "slow"),
    ] {
        let output = dir.path().join(format!("{}.pdf", expected));
        let runner = ScriptedRunner::new(&scripts);
        let result = compressor(FakeProber::all(), runner.clone())
            .with_catalog(catalog)
            .compress(&input, &output)
            .await;

        assert_eq!(result.strategy, expected);
        assert_eq!(result.compressed_size, 250);
        assert_eq!(runner.invoked().len(), 2);
    }
}

#[tokio::test]
async fn test_strategy_named_original_does_not_disturb_fallback() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.pdf", 1000).await;
    let output = dir.path().join("out.pdf");

    let runner = ScriptedRunner::new(&[("original", Script::Write(1500))]);
    let result = compressor(FakeProber::all(), runner.clone())
        .with_catalog(vec![ghostscript("original", PdfSettings::Printer)])
        .compress(&input, &output)
        .await;

    assert!(result.is_fallback());
    assert_eq!(runner.invoked(), vec!["original"]);
    assert_eq!(std::fs::read(&output).unwrap(), vec![b'p'; 1000]);
    assert_eq!(entries(dir.path()), vec!["in.pdf".to_string(), "out.pdf".to_string()]);
}

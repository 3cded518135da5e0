//! # Command Runner
//!
//! Runs external tools for the strategy executor. The [`CommandRunner`] trait is
//! the seam used by tests to replace real subprocesses with scripted outcomes.
//!
//! [`SystemRunner`] spawns through `tokio::process` with `kill_on_drop`, so a
//! timed-out or cancelled invocation never leaves the tool running.

use crate::error::StrategyError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Maximum number of stderr bytes kept in an error report
const STDERR_LIMIT: usize = 2048;

/// One fully resolved tool invocation
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Strategy that produced this invocation, for logging
    pub strategy: &'static str,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    /// File the tool is expected to write
    pub output: PathBuf,
}

/// Captured result of a successful (zero exit) invocation
#[derive(Debug, Clone, Default)]
pub struct ExitReport {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Executes external programs on behalf of strategies
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion, killing it after `timeout`.
    ///
    /// A non-zero exit is an error; so is a spawn failure or a timeout.
    async fn run(&self, invocation: &ToolInvocation, timeout: Duration) -> Result<ExitReport, StrategyError>;
}

/// Runs invocations as real subprocesses
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &ToolInvocation, timeout: Duration) -> Result<ExitReport, StrategyError> {
        debug!("Command arguments: {:?} {:?}", invocation.program, invocation.args);

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(StrategyError::Spawn)?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| StrategyError::TimedOut { seconds: timeout.as_secs() })??;

        if output.status.success() {
            Ok(ExitReport { stdout: output.stdout, stderr: output.stderr })
        } else {
            Err(StrategyError::ExitStatus {
                code: output.status.code(),
                stderr: truncate_stderr(&output.stderr),
            })
        }
    }
}

fn truncate_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_LIMIT {
        return text.to_string();
    }
    let mut end = STDERR_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

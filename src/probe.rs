//! # Tool Availability Probe
//!
//! Determines which compression tool families are installed. Probing never
//! fails: a missing binary, a permission error, a non-zero exit or a probe
//! timeout all mean "unavailable".
//!
//! Availability is computed once per compression request and never cached,
//! since tools can be installed or removed while the process runs.

use crate::strategy::ToolFamily;
use crate::tool_resolver::ToolPathResolver;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Capability detection for one tool family
#[async_trait]
pub trait ToolProber: Send + Sync {
    /// Returns the program to invoke when the family is usable, `None` otherwise
    async fn probe(&self, tool: ToolFamily) -> Option<PathBuf>;
}

/// Probes the host: resolves the executable, then runs `<tool> --version`
#[derive(Debug, Clone)]
pub struct SystemProber {
    resolver: ToolPathResolver,
    timeout: Duration,
}

impl SystemProber {
    pub fn new(resolver: ToolPathResolver, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    async fn responds_to_version(&self, program: &Path) -> bool {
        let mut cmd = Command::new(program);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!("Probe of {:?} failed to run: {}", program, e);
                false
            }
            Err(_) => {
                debug!("Probe of {:?} timed out after {:?}", program, self.timeout);
                false
            }
        }
    }
}

#[async_trait]
impl ToolProber for SystemProber {
    async fn probe(&self, tool: ToolFamily) -> Option<PathBuf> {
        let program = self.resolver.resolve_family(tool)?;
        if self.responds_to_version(&program).await {
            debug!("{} available at {:?}", tool, program);
            Some(program)
        } else {
            None
        }
    }
}

/// Which tool families can be used for the current request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolAvailability {
    generalized_filter: Option<PathBuf>,
    rasterizer: Option<PathBuf>,
}

impl ToolAvailability {
    /// Probe both families concurrently
    pub async fn detect(prober: &dyn ToolProber) -> Self {
        let (generalized_filter, rasterizer) = tokio::join!(
            prober.probe(ToolFamily::GeneralizedFilter),
            prober.probe(ToolFamily::Rasterizer),
        );
        Self { generalized_filter, rasterizer }
    }

    pub fn program(&self, tool: ToolFamily) -> Option<&Path> {
        match tool {
            ToolFamily::GeneralizedFilter => self.generalized_filter.as_deref(),
            ToolFamily::Rasterizer => self.rasterizer.as_deref(),
        }
    }

    pub fn is_available(&self, tool: ToolFamily) -> bool {
        self.program(tool).is_some()
    }

    pub fn none_available(&self) -> bool {
        ToolFamily::ALL.iter().all(|t| !self.is_available(*t))
    }
}

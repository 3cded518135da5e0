//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della compressione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri della pipeline
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento della configurazione da file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `strategy_timeout_secs`: Timeout per ogni strategia (default: 60)
//! - `probe_timeout_secs`: Timeout per il probe dei tool (default: 10)
//! - `tools_dir`: Directory con i tool, cercata prima del PATH (default: None)
//! - `work_dir`: Directory per i file candidati (default: None = accanto all'output)
//! - `skip_strategies`: Strategie del catalogo da disabilitare (default: nessuna)
//! - `workers`: Numero di file compressi in parallelo in modalità batch (default: 4)
//! - `json_output`: Output JSON per uso programmatico (default: false)
//!
//! ## Validazione:
//! - Controlla che i timeout siano > 0
//! - Controlla che workers sia > 0
//! - Controlla che ogni strategia in `skip_strategies` esista nel catalogo
//! - Controlla che `tools_dir` e `work_dir`, se presenti, siano directory
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     strategy_timeout_secs: 120,
//!     skip_strategies: vec!["gs_screen".to_string()],
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::strategy::default_catalog;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for PDF compression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds a single strategy may run before it is killed
    pub strategy_timeout_secs: u64,
    /// Seconds a `--version` probe may run
    pub probe_timeout_secs: u64,
    /// Directory searched for tools before the system PATH
    pub tools_dir: Option<PathBuf>,
    /// Parent directory for per-request work directories (None = output's directory).
    /// Must live on the same filesystem as the outputs.
    pub work_dir: Option<PathBuf>,
    /// Catalog strategies to disable
    pub skip_strategies: Vec<String>,
    /// Number of files compressed concurrently in batch mode
    pub workers: usize,
    /// Output progress and results as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy_timeout_secs: 60,
            probe_timeout_secs: 10,
            tools_dir: None,
            work_dir: None,
            skip_strategies: Vec::new(),
            workers: 4,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.strategy_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Strategy timeout must be greater than 0"));
        }

        if self.probe_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Probe timeout must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        let catalog = default_catalog();
        for name in &self.skip_strategies {
            if !catalog.iter().any(|s| s.name == name.as_str()) {
                let known: Vec<&str> = catalog.iter().map(|s| s.name).collect();
                return Err(anyhow::anyhow!(
                    "Unknown strategy '{}'. Known strategies: {}",
                    name,
                    known.join(", ")
                ));
            }
        }

        for (label, dir) in [("Tools", &self.tools_dir), ("Work", &self.work_dir)] {
            if let Some(dir) = dir {
                if !dir.is_dir() {
                    return Err(anyhow::anyhow!("{} directory does not exist: {}", label, dir.display()));
                }
            }
        }

        Ok(())
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_secs(self.strategy_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Whether a catalog strategy has been disabled
    pub fn is_skipped(&self, strategy: &str) -> bool {
        self.skip_strategies.iter().any(|s| s == strategy)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

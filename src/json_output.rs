//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per comunicazione con altri processi.
//!
//! ## Responsabilità:
//! - Emette messaggi JSON (una riga per messaggio) su stdout
//! - Riusa `CompressionResult` e `AttemptReport` della pipeline
//! - Fornisce interfaccia standardizzata per comunicazione inter-processo
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio compressione di un file
//! - `attempt`: Risultato di una singola strategia
//! - `complete`: Risultato finale di un file
//! - `batch_complete`: Statistiche finali della modalità batch
//! - `error`: Errore generale

use crate::pipeline::{AttemptReport, CompressionResult};
use crate::progress::OptimizationStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della compressione di un file
    #[serde(rename = "start")]
    Start {
        input: PathBuf,
        output: PathBuf,
        config: JsonConfig,
    },

    /// Esito di una strategia
    #[serde(rename = "attempt")]
    Attempt {
        input: PathBuf,
        #[serde(flatten)]
        report: AttemptReport,
    },

    /// Fine compressione di un file
    #[serde(rename = "complete")]
    Complete {
        #[serde(flatten)]
        result: CompressionResult,
    },

    /// Fine della modalità batch
    #[serde(rename = "batch_complete")]
    BatchComplete {
        files_processed: usize,
        files_compressed: usize,
        files_unchanged: usize,
        errors: usize,
        total_bytes_saved: u64,
        average_reduction: f64,
        duration_seconds: f64,
    },

    /// Errore generale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub strategy_timeout_secs: u64,
    pub skip_strategies: Vec<String>,
    pub workers: usize,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(input: PathBuf, output: PathBuf, config: JsonConfig) -> Self {
        Self::Start { input, output, config }
    }

    /// Un messaggio `attempt` per ogni strategia eseguita, poi `complete`
    pub fn for_result(input: PathBuf, result: &CompressionResult) -> Vec<Self> {
        let mut messages: Vec<Self> = result
            .attempts
            .iter()
            .map(|report| Self::Attempt { input: input.clone(), report: report.clone() })
            .collect();
        messages.push(Self::Complete { result: result.clone() });
        messages
    }

    pub fn batch_complete(stats: &OptimizationStats, duration_seconds: f64) -> Self {
        Self::BatchComplete {
            files_processed: stats.files_processed,
            files_compressed: stats.files_compressed,
            files_unchanged: stats.files_unchanged,
            errors: stats.errors,
            total_bytes_saved: stats.total_bytes_saved,
            average_reduction: stats.overall_reduction_percent(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&crate::Config> for JsonConfig {
    fn from(config: &crate::Config) -> Self {
        Self {
            strategy_timeout_secs: config.strategy_timeout_secs,
            skip_strategies: config.skip_strategies.clone(),
            workers: config.workers,
        }
    }
}

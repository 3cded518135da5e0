//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della pipeline di compressione.
//!
//! ## Responsabilità:
//! - `CompressError`: errori fatali a livello di richiesta (input invalido, finalize)
//! - `StrategyError`: fallimenti di una singola strategia, trattati come dati
//! - Integra con `thiserror` per conversioni automatiche e messaggi chiari
//!
//! ## Categorie di errori pipeline:
//! - `InvalidInput`: file di input mancante, vuoto o non regolare
//! - `WorkArea`: impossibile creare la directory temporanea della richiesta
//! - `Finalize`: rename/copy verso il path di output fallito (es. disco pieno)
//!
//! ## Categorie di errori strategia:
//! - `Spawn`: il tool esterno non è stato avviato
//! - `TimedOut`: il tool ha superato il timeout ed è stato terminato
//! - `ExitStatus`: exit code diverso da zero
//! - `MissingOutput` / `EmptyOutput`: nessun file candidato utilizzabile
//!
//! ## Esempio:
//! ```ignore
//! if size == 0 {
//!     return Err(CompressError::InvalidInput(format!("input file is empty: {}", path.display())));
//! }
//! ```

use std::path::PathBuf;

/// Fatal errors that abort a compression request
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to prepare work directory {path}: {source}")]
    WorkArea {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output {path}: {source}")]
    Finalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single strategy execution.
///
/// Never aborts the pipeline; the selector logs it and moves on.
#[derive(thiserror::Error, Debug)]
pub enum StrategyError {
    #[error("failed to spawn tool: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("timed out after {seconds}s")]
    TimedOut { seconds: u64 },

    #[error("exited with {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| format!("status {}", c)))]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("tool produced no output file")]
    MissingOutput,

    #[error("tool produced an empty output file")]
    EmptyOutput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

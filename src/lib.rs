//! # PDF Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per richieste e strategie
//! - `strategy`: Catalogo delle strategie di compressione (qpdf, Ghostscript)
//! - `tool_resolver`: Ricerca dei tool (directory tools, poi PATH)
//! - `probe`: Rilevamento dei tool disponibili
//! - `runner`: Esecuzione dei processi esterni con timeout
//! - `pipeline`: Orchestratore di una richiesta di compressione
//! - `batch`: Compressione di intere directory
//! - `file_manager`: Operazioni sui file e discovery PDF
//! - `progress`: Progress tracking e statistiche
//! - `json_output`: Output JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```ignore
//! use pdf_optimizer::{Config, PdfCompressor};
//!
//! let compressor = PdfCompressor::new(Config::default())?;
//! let result = compressor.compress(&input, &output).await;
//! println!("{} ({:.2}% saved)", result.strategy, result.compression_ratio);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod runner;
pub mod strategy;
pub mod tool_resolver;
pub mod utils;

pub use batch::BatchCompressor;
pub use config::Config;
pub use error::{CompressError, StrategyError};
pub use pipeline::{AttemptReport, CompressionResult, PdfCompressor, NO_STRATEGY};
pub use probe::{SystemProber, ToolAvailability, ToolProber};
pub use runner::{CommandRunner, ExitReport, SystemRunner, ToolInvocation};
pub use strategy::{CompressionStrategy, ToolFamily};
pub use tool_resolver::ToolPathResolver;

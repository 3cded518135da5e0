//! # Compression Pipeline
//!
//! Sottomoduli della pipeline di compressione:
//! - `pdf_compressor`: Orchestratore di una richiesta
//! - `executor`: Esecuzione di una singola strategia
//! - `selector`: Fold dei risultati e gestione dei file candidati
//! - `fallback`: Copia dell'originale quando nessuna strategia migliora
//! - `finalizer`: Rename atomico del vincitore e statistiche
//! - `work_area`: Directory temporanea isolata per richiesta
//! - `result`: Valori restituiti al chiamante

pub mod executor;
pub mod fallback;
pub mod finalizer;
pub mod pdf_compressor;
pub mod result;
pub mod selector;
pub mod work_area;

pub use executor::{CompressionAttempt, StrategyExecutor, StrategyFailure};
pub use pdf_compressor::PdfCompressor;
pub use result::{AttemptReport, CompressionResult, NO_STRATEGY};
pub use selector::{Best, Selection};
pub use work_area::WorkArea;

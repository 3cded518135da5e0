//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file usate dalla pipeline.
//!
//! ## Responsabilità:
//! - Dimensione dei file (stat) per input e candidati
//! - Cancellazione idempotente dei candidati (file inesistente = ok)
//! - Rename atomico del vincitore sul path di output
//! - Copia verbatim dell'originale per il fallback
//! - Discovery ricorsiva dei PDF per la modalità batch
//! - Formattazione human-readable delle dimensioni
//!
//! ## Sicurezza operazioni:
//! - Il path di output viene scritto solo con `rename`, mai con copie parziali
//! - `remove_if_exists` non fallisce se il file è già stato rimosso
//!
//! ## Esempio:
//! ```ignore
//! let size = FileManager::file_size(&candidate).await?;
//! FileManager::remove_if_exists(&candidate).await?;
//! ```

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// File operations for the compression pipeline
pub struct FileManager;

impl FileManager {
    /// Size in bytes of a file
    pub async fn file_size(path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Delete a file; a missing file is not an error
    pub async fn remove_if_exists(path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Atomically move `from` over `to` (same filesystem)
    pub async fn rename(from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }

    /// Byte-for-byte copy, returns the number of bytes copied
    pub async fn copy(from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to).await
    }

    /// Find all PDF files in a directory, sorted for stable batch order
    pub fn find_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| Self::is_pdf(p))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Check if a file has a `.pdf` extension (case-insensitive)
    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

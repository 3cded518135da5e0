//! # Strategy Catalog
//!
//! The ordered list of compression strategies tried against every input.
//!
//! Each strategy is a value: a unique name plus a tagged parameter set. The
//! parameter tag decides both the tool family and the command line, so adding
//! or removing a strategy is a change to [`DEFAULT_CATALOG`] only.
//!
//! | # | Name              | Tool        | Parameters                                  |
//! |---|-------------------|-------------|---------------------------------------------|
//! | 1 | `qpdf_aggressive` | qpdf        | stream + object-stream compression, level 9 |
//! | 2 | `gs_screen`       | ghostscript | `/screen`, 72 dpi                           |
//! | 3 | `gs_ebook`        | ghostscript | `/ebook`, 150 dpi                           |
//! | 4 | `gs_printer`      | ghostscript | `/printer`, 300 dpi                         |
//! | 5 | `gs_prepress`     | ghostscript | `/prepress`, 300 dpi                        |
//! | 6 | `qpdf_linearize`  | qpdf        | linearize only                              |
//!
//! Catalog order is the tie-break: when two strategies produce the same size,
//! the one listed first wins.

use crate::args;
use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;

/// The two families of external compression engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    /// Stream/object filter that rewrites the PDF structure (qpdf)
    GeneralizedFilter,
    /// Re-renders the document and downsamples images (Ghostscript)
    Rasterizer,
}

impl ToolFamily {
    pub const ALL: [ToolFamily; 2] = [ToolFamily::GeneralizedFilter, ToolFamily::Rasterizer];

    /// Executable names to look for, in order of preference
    pub fn binary_names(&self) -> &'static [&'static str] {
        match self {
            ToolFamily::GeneralizedFilter => &["qpdf"],
            ToolFamily::Rasterizer => {
                if cfg!(windows) {
                    &["gswin64c", "gswin32c", "gs"]
                } else {
                    &["gs"]
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolFamily::GeneralizedFilter => "qpdf",
            ToolFamily::Rasterizer => "ghostscript",
        }
    }

    /// Installation instructions shown in the tools report
    pub fn install_hint(&self) -> &'static str {
        match self {
            ToolFamily::GeneralizedFilter => {
                if cfg!(target_os = "macos") {
                    "brew install qpdf"
                } else if cfg!(windows) {
                    "download from https://github.com/qpdf/qpdf/releases"
                } else {
                    "sudo apt-get install qpdf"
                }
            }
            ToolFamily::Rasterizer => {
                if cfg!(target_os = "macos") {
                    "brew install ghostscript"
                } else if cfg!(windows) {
                    "download from https://ghostscript.com/releases/gsdnld.html"
                } else {
                    "sudo apt-get install ghostscript"
                }
            }
        }
    }
}

impl fmt::Display for ToolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ghostscript `-dPDFSETTINGS` presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfSettings {
    Screen,
    Ebook,
    Printer,
    Prepress,
}

impl PdfSettings {
    fn as_arg(&self) -> &'static str {
        match self {
            PdfSettings::Screen => "/screen",
            PdfSettings::Ebook => "/ebook",
            PdfSettings::Printer => "/printer",
            PdfSettings::Prepress => "/prepress",
        }
    }
}

/// Invocation parameters; the variant also binds the tool family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyParams {
    Qpdf {
        compress_streams: bool,
        object_streams: bool,
        recompress_flate: bool,
        compression_level: Option<u8>,
        linearize: bool,
    },
    Ghostscript {
        settings: PdfSettings,
        resolution_dpi: u32,
    },
}

/// A named, fixed combination of a tool and its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionStrategy {
    pub name: &'static str,
    pub params: StrategyParams,
}

impl CompressionStrategy {
    pub const fn new(name: &'static str, params: StrategyParams) -> Self {
        Self { name, params }
    }

    /// Tool family required to run this strategy
    pub fn tool(&self) -> ToolFamily {
        match self.params {
            StrategyParams::Qpdf { .. } => ToolFamily::GeneralizedFilter,
            StrategyParams::Ghostscript { .. } => ToolFamily::Rasterizer,
        }
    }

    /// Builds the tool arguments that read `input` and write `candidate`.
    ///
    /// Pure: no filesystem access, no program name.
    pub fn argv(&self, input: &Path, candidate: &Path) -> Vec<OsString> {
        match self.params {
            StrategyParams::Qpdf {
                compress_streams,
                object_streams,
                recompress_flate,
                compression_level,
                linearize,
            } => {
                let mut argv = Vec::new();
                if linearize {
                    argv.extend(args!["--linearize"]);
                }
                if compress_streams {
                    argv.extend(args!["--compress-streams=y"]);
                }
                if object_streams {
                    argv.extend(args!["--object-streams=generate"]);
                }
                if recompress_flate {
                    argv.extend(args!["--recompress-flate"]);
                }
                if let Some(level) = compression_level {
                    argv.extend(args![format!("--compression-level={}", level)]);
                }
                argv.extend(args![input, candidate]);
                argv
            }
            StrategyParams::Ghostscript { settings, resolution_dpi } => {
                let dpi = resolution_dpi.to_string();
                let mut output_flag = OsString::from("-sOutputFile=");
                output_flag.push(escape_output_template(candidate));

                args![
                    "-sDEVICE=pdfwrite",
                    "-dCompatibilityLevel=1.4",
                    format!("-dPDFSETTINGS={}", settings.as_arg()),
                    "-dNOPAUSE",
                    "-dQUIET",
                    "-dBATCH",
                    "-dSAFER",
                    "-dDetectDuplicateImages=true",
                    "-dCompressFonts=true",
                    "-dDownsampleColorImages=true",
                    format!("-dColorImageResolution={}", dpi),
                    "-dDownsampleGrayImages=true",
                    format!("-dGrayImageResolution={}", dpi),
                    "-dDownsampleMonoImages=true",
                    format!("-dMonoImageResolution={}", dpi),
                    output_flag,
                    input,
                ]
            }
        }
    }
}

/// Ghostscript reads `%` in `-sOutputFile` as a page-number template; `%%` is a literal `%`
fn escape_output_template(path: &Path) -> OsString {
    match path.to_str() {
        Some(text) if text.contains('%') => OsString::from(text.replace('%', "%%")),
        _ => path.as_os_str().to_os_string(),
    }
}

const fn ghostscript(name: &'static str, settings: PdfSettings, resolution_dpi: u32) -> CompressionStrategy {
    CompressionStrategy::new(name, StrategyParams::Ghostscript { settings, resolution_dpi })
}

/// Built-in strategies in tie-break order
pub const DEFAULT_CATALOG: &[CompressionStrategy] = &[
    CompressionStrategy::new(
        "qpdf_aggressive",
        StrategyParams::Qpdf {
            compress_streams: true,
            object_streams: true,
            recompress_flate: true,
            compression_level: Some(9),
            linearize: false,
        },
    ),
    ghostscript("gs_screen", PdfSettings::Screen, 72),
    ghostscript("gs_ebook", PdfSettings::Ebook, 150),
    ghostscript("gs_printer", PdfSettings::Printer, 300),
    ghostscript("gs_prepress", PdfSettings::Prepress, 300),
    CompressionStrategy::new(
        "qpdf_linearize",
        StrategyParams::Qpdf {
            compress_streams: false,
            object_streams: false,
            recompress_flate: false,
            compression_level: None,
            linearize: true,
        },
    ),
];

pub fn default_catalog() -> Vec<CompressionStrategy> {
    DEFAULT_CATALOG.to_vec()
}

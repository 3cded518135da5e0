//! # Utility Functions Module
//!
//! Helpers for building external tool command lines.

use std::ffi::{OsStr, OsString};

/// Converts any OS-string-like value into an owned command line argument.
///
/// Paths, `&str` literals and `format!` results can all be mixed in one
/// argument list without lossy UTF-8 conversion of file names.
///
/// # Example
/// ```rust
/// use std::path::Path;
/// use pdf_optimizer::utils::os_arg;
///
/// let arg = os_arg(Path::new("/tmp/input.pdf"));
/// assert_eq!(arg, "/tmp/input.pdf");
/// ```
pub fn os_arg<S>(item: &S) -> OsString
where
    S: AsRef<OsStr> + ?Sized,
{
    item.as_ref().to_os_string()
}

/// Macro for convenient argument building.
///
/// Each item may have a different type as long as it implements `AsRef<OsStr>`.
///
/// # Example
/// ```rust
/// use pdf_optimizer::args;
/// use std::path::Path;
///
/// let dpi = 150;
/// let args = args!["-sDEVICE=pdfwrite", format!("-r{}", dpi), Path::new("in.pdf")];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($crate::utils::os_arg(&$item)),*]
    };
}

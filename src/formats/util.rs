use std::path::Path;

use super::{IoError, Result};

pub(crate) fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    Ok(ext)
}

pub(crate) fn is_fits_extension(extension: &str) -> bool {
    matches!(extension, "fits" | "fit" | "fts")
}

pub(crate) fn is_nrrd_extension(extension: &str) -> bool {
    extension == "nrrd"
}

/// Bytes needed to pad `length` up to the next multiple of `block`.
pub(crate) fn padding(length: usize, block: usize) -> usize {
    (block - length % block) % block
}

/// Formats a float so that it always reads back as a real number
/// (`900.0`, `1.0E-20`), never as an integer.
pub(crate) fn real_literal(value: f64) -> String {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => text,
    }
}

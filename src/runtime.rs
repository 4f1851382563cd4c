mod context;
mod conversion_service;
mod cube_service;
mod error;
mod header_service;

#[cfg(test)]
mod tests;

pub use context::AppContext;
pub use conversion_service::{ConversionReport, ConversionService, ConvertRequest};
pub use cube_service::{CubeService, StripReport, TrimReport};
pub use error::{AppError, Result};
pub use header_service::{CubeInfo, HeaderService, PresetEntry};

/// Converts one FITS cube to an NRRD volume with the default codecs and the
/// built-in preset registry.
pub fn convert(request: &ConvertRequest) -> Result<ConversionReport> {
    ConversionService::default().convert(request)
}

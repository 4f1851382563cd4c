use thiserror::Error;

use super::SkyAxis;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("header is missing `{key}` required for the {axis} axis")]
    MissingAxis { axis: SkyAxis, key: String },

    #[error("header keyword `{key}` for the {axis} axis has invalid value {value}")]
    InvalidAxisValue {
        axis: SkyAxis,
        key: String,
        value: String,
    },

    #[error(
        "cube has {ndim} axes but conversion needs exactly 3 (RA, Dec, Velocity); strip degenerate axes first"
    )]
    UnsupportedAxes { ndim: usize },

    #[error(
        "header dimensionality mismatch: data has {data_ndim} dimensions but NAXIS is {meta_ndim}"
    )]
    DimensionalityMismatch { data_ndim: usize, meta_ndim: usize },

    #[error(
        "dimension size mismatch at FITS axis {axis}: data size {data_size} != NAXIS{axis} {meta_size}"
    )]
    DimensionSizeMismatch {
        axis: usize,
        data_size: usize,
        meta_size: usize,
    },

    #[error("invalid dimension size 0 at axis {axis}")]
    ZeroSizedDimension { axis: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

use crate::geometry::GeometryError;
use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpsError>;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("velocity resampling failed: {0}")]
    Resample(#[from] GeometryError),

    #[error("velocity range {start}..{end} is outside the axis of length {length}")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("unsupported cube layout: {0}")]
    UnsupportedLayout(String),

    #[error("core cube error: {0}")]
    Core(#[from] CoreError),
}

use crate::convention::ConventionError;
use crate::formats::IoError;
use crate::geometry::GeometryError;
use crate::model::CoreError;
use crate::ops::OpsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cube error: {0}")]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error("convention error: {0}")]
    Convention(#[from] ConventionError),

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("operation error: {0}")]
    Ops(#[from] OpsError),
}

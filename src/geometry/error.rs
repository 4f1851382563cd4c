use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error(
        "invalid velocity scale `{input}`: expected nothing, `auto`, or a positive number"
    )]
    InvalidScale { input: String },

    #[error(
        "cannot resample velocity axis of length {length} by {scale}: target length {target} must be an integer >= 2"
    )]
    Resample {
        length: usize,
        scale: f64,
        target: f64,
    },
}

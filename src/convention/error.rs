use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConventionError>;

#[derive(Debug, Error)]
pub enum ConventionError {
    #[error("unknown alignment convention `{name}` (known presets: {known})")]
    UnknownConvention { name: String, known: String },

    #[error("alignment convention field `{field}` has invalid value {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("cannot read convention file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("convention YAML failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("convention JSON failure: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

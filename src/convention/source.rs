use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{AlignmentConvention, ConventionRegistry, Result, load_convention};

/// Where a conversion's alignment convention comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConventionSource {
    Preset(String),
    File(PathBuf),
    Values(AlignmentConvention),
}

impl ConventionSource {
    /// Treats the argument as a file when it names an existing file or has a
    /// preset-file extension, and as a preset name otherwise.
    pub fn parse(value: &str) -> Self {
        let path = Path::new(value);
        let has_file_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml" | "json"))
            .unwrap_or(false);
        if has_file_extension || path.is_file() {
            ConventionSource::File(path.to_path_buf())
        } else {
            ConventionSource::Preset(value.to_string())
        }
    }

    pub fn resolve(&self, registry: &ConventionRegistry) -> Result<AlignmentConvention> {
        match self {
            ConventionSource::Preset(name) => registry.get(name),
            ConventionSource::File(path) => load_convention(path),
            ConventionSource::Values(convention) => convention.validated(),
        }
    }
}

impl FromStr for ConventionSource {
    type Err = Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl fmt::Display for ConventionSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConventionSource::Preset(name) => write!(formatter, "preset `{name}`"),
            ConventionSource::File(path) => write!(formatter, "file {}", path.display()),
            ConventionSource::Values(_) => formatter.write_str("caller-supplied values"),
        }
    }
}

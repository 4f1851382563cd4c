use std::fs;
use std::path::Path;

use super::{AlignmentConvention, ConventionError, Result};

/// Loads a preset file with keys `ra-mm`, `dec-mm`, `vel-mm`, `ra0`, `dec0`
/// and `vel0`. `.yaml`/`.yml` files are YAML, anything else JSON.
pub fn load_convention(path: impl AsRef<Path>) -> Result<AlignmentConvention> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConventionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let convention = if is_yaml(path) {
        serde_yaml::from_str::<AlignmentConvention>(&raw)?
    } else {
        serde_json::from_str::<AlignmentConvention>(&raw)?
    };
    convention.validated()
}

fn is_yaml(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(extension.as_str(), "yaml" | "yml")
}

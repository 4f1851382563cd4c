use std::collections::BTreeMap;

use super::{AlignmentConvention, ConventionError, Result};

/// Reference frame used for the NGC 1333 molecular-line cubes.
pub const NGC1333: AlignmentConvention =
    AlignmentConvention::from_parts(900.0, 900.0, 0.1, 52.24, 31.40, 7800.0);

const BUILTIN: &[(&str, AlignmentConvention)] = &[("ngc1333", NGC1333)];

/// Named alignment presets. Starts with the built-in set; callers may
/// register more before a conversion.
#[derive(Debug, Clone)]
pub struct ConventionRegistry {
    presets: BTreeMap<String, AlignmentConvention>,
}

impl Default for ConventionRegistry {
    fn default() -> Self {
        Self {
            presets: BUILTIN
                .iter()
                .map(|(name, convention)| ((*name).to_string(), *convention))
                .collect(),
        }
    }
}

impl ConventionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, convention: AlignmentConvention) -> Result<()> {
        let convention = convention.validated()?;
        self.presets.insert(normalize(name), convention);
        Ok(())
    }

    /// Looks a preset up by name, case-insensitively. A trailing `_conv`
    /// (the historical convention-file suffix) is ignored.
    pub fn get(&self, name: &str) -> Result<AlignmentConvention> {
        let key = normalize(name);
        self.presets
            .get(&key)
            .or_else(|| {
                key.strip_suffix("_conv")
                    .and_then(|stem| self.presets.get(stem))
            })
            .copied()
            .ok_or_else(|| ConventionError::UnknownConvention {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlignmentConvention)> {
        self.presets
            .iter()
            .map(|(name, convention)| (name.as_str(), convention))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

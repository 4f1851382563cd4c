use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::{HeaderView, SkyAxis};

use super::{GeometryError, Result};

/// Requested velocity-axis rescale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityScale {
    /// No rescale (factor 1).
    #[default]
    Unset,
    /// Match the velocity axis to the shortest spatial axis.
    Auto,
    Factor(f64),
}

impl VelocityScale {
    /// Rejects explicit factors that can never resolve, so callers can fail
    /// before touching any file.
    pub fn validate(&self) -> Result<()> {
        match self {
            VelocityScale::Factor(factor) if !(factor.is_finite() && *factor > 0.0) => {
                Err(GeometryError::InvalidScale {
                    input: factor.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for VelocityScale {
    type Err = GeometryError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "false" | "none" | "0" => return Ok(VelocityScale::Unset),
            "auto" => return Ok(VelocityScale::Auto),
            _ => {}
        }
        let invalid = || GeometryError::InvalidScale {
            input: value.to_string(),
        };
        let factor = trimmed.parse::<f64>().map_err(|_| invalid())?;
        if factor == 0.0 {
            return Ok(VelocityScale::Unset);
        }
        if !(factor.is_finite() && factor > 0.0) {
            return Err(invalid());
        }
        Ok(VelocityScale::Factor(factor))
    }
}

impl fmt::Display for VelocityScale {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocityScale::Unset => formatter.write_str("unset"),
            VelocityScale::Auto => formatter.write_str("auto"),
            VelocityScale::Factor(factor) => write!(formatter, "{factor}"),
        }
    }
}

/// Effective velocity-axis factor for a cube.
pub fn resolve(input: &VelocityScale, header: &HeaderView) -> Result<f64> {
    input.validate()?;
    let scale = match input {
        VelocityScale::Unset => 1.0,
        VelocityScale::Auto => {
            let shortest_spatial = header
                .length(SkyAxis::Ra)
                .min(header.length(SkyAxis::Dec));
            shortest_spatial as f64 / header.length(SkyAxis::Velocity) as f64
        }
        VelocityScale::Factor(factor) => *factor,
    };
    Ok(scale)
}

/// Velocity-axis length after regridding by `scale`, rounding half to even.
pub fn resampled_length(length: usize, scale: f64) -> Result<usize> {
    let target = (length as f64 * scale).round_ties_even();
    if !target.is_finite() || target < 2.0 {
        return Err(GeometryError::Resample {
            length,
            scale,
            target,
        });
    }
    Ok(target as usize)
}

use serde::{Deserialize, Serialize};

use super::{ConventionError, Result};

/// Fixed physical reference point plus per-axis millimetre scale factors
/// shared by every cube that should overlay in one viewer scene.
///
/// Angles are degrees, velocities m/s. `ra_mm`/`dec_mm` are millimetres
/// per degree of arc and `vel_mm` millimetres per m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConvention {
    #[serde(rename = "ra-mm")]
    ra_mm: f64,
    #[serde(rename = "dec-mm")]
    dec_mm: f64,
    #[serde(rename = "vel-mm")]
    vel_mm: f64,
    ra0: f64,
    dec0: f64,
    vel0: f64,
}

impl AlignmentConvention {
    pub fn new(
        ra_mm: f64,
        dec_mm: f64,
        vel_mm: f64,
        ra0: f64,
        dec0: f64,
        vel0: f64,
    ) -> Result<Self> {
        Self::from_parts(ra_mm, dec_mm, vel_mm, ra0, dec0, vel0).validated()
    }

    pub(super) const fn from_parts(
        ra_mm: f64,
        dec_mm: f64,
        vel_mm: f64,
        ra0: f64,
        dec0: f64,
        vel0: f64,
    ) -> Self {
        Self {
            ra_mm,
            dec_mm,
            vel_mm,
            ra0,
            dec0,
            vel0,
        }
    }

    /// Checks values that did not come through `new` (e.g. deserialized ones).
    pub fn validated(self) -> Result<Self> {
        let fields = [
            ("ra-mm", self.ra_mm),
            ("dec-mm", self.dec_mm),
            ("vel-mm", self.vel_mm),
            ("ra0", self.ra0),
            ("dec0", self.dec0),
            ("vel0", self.vel0),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConventionError::InvalidValue { field, value });
            }
        }
        for &(field, value) in &fields[..3] {
            if value == 0.0 {
                return Err(ConventionError::InvalidValue { field, value });
            }
        }
        if self.dec0.abs() > 90.0 {
            return Err(ConventionError::InvalidValue {
                field: "dec0",
                value: self.dec0,
            });
        }
        Ok(self)
    }

    pub fn ra_mm(&self) -> f64 {
        self.ra_mm
    }

    pub fn dec_mm(&self) -> f64 {
        self.dec_mm
    }

    pub fn vel_mm(&self) -> f64 {
        self.vel_mm
    }

    pub fn ra0(&self) -> f64 {
        self.ra0
    }

    pub fn dec0(&self) -> f64 {
        self.dec0
    }

    pub fn vel0(&self) -> f64 {
        self.vel0
    }
}

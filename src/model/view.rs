use serde::Serialize;

use super::{CoreError, FitsHeader, HeaderValue, Result, SkyAxis};

/// Linear world-coordinate description of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisWcs {
    pub length: usize,
    pub ref_pixel: f64,
    pub ref_value: f64,
    pub delta: f64,
}

/// Read-only view over the axis keywords of a RA/Dec/Velocity cube header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeaderView {
    ra: AxisWcs,
    dec: AxisWcs,
    velocity: AxisWcs,
}

impl HeaderView {
    pub fn new(ra: AxisWcs, dec: AxisWcs, velocity: AxisWcs) -> Result<Self> {
        let view = Self { ra, dec, velocity };
        for axis in SkyAxis::ALL {
            let wcs = view.axis(axis);
            if wcs.length == 0 {
                return Err(CoreError::ZeroSizedDimension {
                    axis: axis.fits_index(),
                });
            }
            check_finite(axis, "CRPIX", wcs.ref_pixel)?;
            check_finite(axis, "CRVAL", wcs.ref_value)?;
            check_finite(axis, "CDELT", wcs.delta)?;
            if wcs.delta == 0.0 {
                return Err(CoreError::InvalidAxisValue {
                    axis,
                    key: axis.keyword("CDELT"),
                    value: "0".to_string(),
                });
            }
        }
        Ok(view)
    }

    pub fn from_header(header: &FitsHeader) -> Result<Self> {
        Self::new(
            axis_from_header(header, SkyAxis::Ra)?,
            axis_from_header(header, SkyAxis::Dec)?,
            axis_from_header(header, SkyAxis::Velocity)?,
        )
    }

    pub fn axis(&self, axis: SkyAxis) -> &AxisWcs {
        match axis {
            SkyAxis::Ra => &self.ra,
            SkyAxis::Dec => &self.dec,
            SkyAxis::Velocity => &self.velocity,
        }
    }

    pub fn length(&self, axis: SkyAxis) -> usize {
        self.axis(axis).length
    }

    pub fn ref_pixel(&self, axis: SkyAxis) -> f64 {
        self.axis(axis).ref_pixel
    }

    pub fn ref_value(&self, axis: SkyAxis) -> f64 {
        self.axis(axis).ref_value
    }

    pub fn delta(&self, axis: SkyAxis) -> f64 {
        self.axis(axis).delta
    }

    /// Array shape as decoded from FITS: (Velocity, Dec, RA).
    pub fn source_shape(&self) -> [usize; 3] {
        let mut shape = [0; 3];
        for axis in SkyAxis::ALL {
            shape[axis.source_position()] = self.length(axis);
        }
        shape
    }
}

fn axis_from_header(header: &FitsHeader, axis: SkyAxis) -> Result<AxisWcs> {
    let length_key = axis.keyword("NAXIS");
    let length = match lookup(header, axis, &length_key)? {
        HeaderValue::Integer(value) if *value > 0 => *value as usize,
        other => {
            return Err(CoreError::InvalidAxisValue {
                axis,
                key: length_key,
                value: other.to_string(),
            });
        }
    };
    Ok(AxisWcs {
        length,
        ref_pixel: real(header, axis, "CRPIX")?,
        ref_value: real(header, axis, "CRVAL")?,
        delta: real(header, axis, "CDELT")?,
    })
}

fn lookup<'a>(header: &'a FitsHeader, axis: SkyAxis, key: &str) -> Result<&'a HeaderValue> {
    header.get(key).ok_or_else(|| CoreError::MissingAxis {
        axis,
        key: key.to_string(),
    })
}

fn real(header: &FitsHeader, axis: SkyAxis, prefix: &str) -> Result<f64> {
    let key = axis.keyword(prefix);
    let value = lookup(header, axis, &key)?;
    value.as_f64().ok_or_else(|| CoreError::InvalidAxisValue {
        axis,
        key,
        value: value.to_string(),
    })
}

fn check_finite(axis: SkyAxis, prefix: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidAxisValue {
            axis,
            key: axis.keyword(prefix),
            value: value.to_string(),
        })
    }
}

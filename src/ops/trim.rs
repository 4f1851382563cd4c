use std::ops::Range;

use ndarray::{Array3, s};

use super::{OpsError, Result};

/// Keeps velocity planes `range` of a (Velocity, Dec, RA) array.
pub fn trim_velocity(data: &Array3<f32>, range: Range<usize>) -> Result<Array3<f32>> {
    let length = data.dim().0;
    if range.start >= range.end || range.end > length {
        return Err(OpsError::InvalidRange {
            start: range.start,
            end: range.end,
            length,
        });
    }
    Ok(data.slice(s![range.start..range.end, .., ..]).to_owned())
}

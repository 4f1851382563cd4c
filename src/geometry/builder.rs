//! Voxel spacing and physical origin for a viewer-ordered volume.
//!
//! Centres are computed per sky axis in source semantics and only placed
//! into (RA, Velocity, Dec) slots at the very end through
//! [`SkyAxis::target_position`].

use std::f64::consts::PI;

use serde::Serialize;

use crate::convention::AlignmentConvention;
use crate::model::{Encoding, HeaderView, SkyAxis, SpaceFrame, VolumeMetadata, VoxelKind};

use super::{GeometryError, Result, resampled_length};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryMode {
    /// Unit voxels, cube centred on its own middle.
    Centered,
    /// Millimetre voxels pinned to an alignment convention's reference point.
    Convention,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub mode: GeometryMode,
    pub velocity_scale: f64,
    pub space: SpaceFrame,
    pub space_directions: [[f64; 3]; 3],
    pub kinds: [VoxelKind; 3],
    pub space_origin: [f64; 3],
}

impl Geometry {
    /// Signed diagonal spacing of `axis` in the output volume.
    pub fn spacing(&self, axis: SkyAxis) -> f64 {
        let position = axis.target_position();
        self.space_directions[position][position]
    }

    pub fn origin(&self, axis: SkyAxis) -> f64 {
        self.space_origin[axis.target_position()]
    }

    pub fn metadata(&self, encoding: Encoding) -> VolumeMetadata {
        VolumeMetadata {
            space: self.space,
            space_directions: self.space_directions,
            kinds: self.kinds,
            space_origin: self.space_origin,
            encoding,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisFrame {
    spacing: f64,
    center: f64,
}

#[derive(Debug, Clone, Copy)]
struct Frames {
    ra: AxisFrame,
    dec: AxisFrame,
    velocity: AxisFrame,
}

impl Frames {
    fn get(&self, axis: SkyAxis) -> AxisFrame {
        match axis {
            SkyAxis::Ra => self.ra,
            SkyAxis::Dec => self.dec,
            SkyAxis::Velocity => self.velocity,
        }
    }
}

/// Derives the output geometry. Without a convention the cube is centred on
/// itself and `velocity_scale` is assumed to have been applied by
/// resampling; with one, the scale only converts the reference velocity.
pub fn build(
    header: &HeaderView,
    velocity_scale: f64,
    convention: Option<&AlignmentConvention>,
) -> Result<Geometry> {
    if !(velocity_scale.is_finite() && velocity_scale > 0.0) {
        return Err(GeometryError::InvalidScale {
            input: velocity_scale.to_string(),
        });
    }
    let (mode, frames) = match convention {
        None => (
            GeometryMode::Centered,
            centered_frames(header, velocity_scale)?,
        ),
        Some(convention) => (
            GeometryMode::Convention,
            convention_frames(header, velocity_scale, convention),
        ),
    };

    let mut space_directions = [[0.0; 3]; 3];
    let mut space_origin = [0.0; 3];
    for axis in SkyAxis::ALL {
        let frame = frames.get(axis);
        let position = axis.target_position();
        // Increasing RA runs toward negative viewer x.
        let sign = if axis == SkyAxis::Ra { -1.0 } else { 1.0 };
        space_directions[position][position] = sign * frame.spacing;
        space_origin[position] = frame.center * frame.spacing;
    }

    Ok(Geometry {
        mode,
        velocity_scale,
        space: SpaceFrame::LeftPosteriorSuperior,
        space_directions,
        kinds: [VoxelKind::Domain; 3],
        space_origin,
    })
}

fn centered_frames(header: &HeaderView, velocity_scale: f64) -> Result<Frames> {
    let native_length = header.length(SkyAxis::Velocity);
    let (velocity_length, velocity_spacing) = if velocity_scale != 1.0 {
        (
            resampled_length(native_length, velocity_scale)?,
            1.0 / velocity_scale,
        )
    } else {
        (native_length, 1.0)
    };
    Ok(Frames {
        ra: AxisFrame {
            spacing: 1.0,
            center: header.length(SkyAxis::Ra) as f64 / 2.0,
        },
        dec: AxisFrame {
            spacing: 1.0,
            center: -(header.length(SkyAxis::Dec) as f64) / 2.0,
        },
        velocity: AxisFrame {
            spacing: velocity_spacing,
            center: -(velocity_length as f64) / 2.0,
        },
    })
}

fn convention_frames(
    header: &HeaderView,
    velocity_scale: f64,
    convention: &AlignmentConvention,
) -> Frames {
    let ra = header.axis(SkyAxis::Ra);
    let dec = header.axis(SkyAxis::Dec);
    let velocity = header.axis(SkyAxis::Velocity);

    // RA degrees shrink by cos(dec) away from the equator.
    let dec0_radians = convention.dec0() * PI / 180.0;
    let ra_center =
        (convention.ra0() - ra.ref_value) * dec0_radians.cos() / ra.delta + ra.ref_pixel;
    let dec_center = -((convention.dec0() - dec.ref_value) / dec.delta + dec.ref_pixel);
    let vel0 = convention.vel0() / velocity_scale;
    let velocity_center = -((vel0 - velocity.ref_value) / velocity.delta + velocity.ref_pixel);

    Frames {
        ra: AxisFrame {
            spacing: ra.delta * convention.ra_mm(),
            center: ra_center,
        },
        dec: AxisFrame {
            spacing: dec.delta * convention.dec_mm(),
            center: dec_center,
        },
        velocity: AxisFrame {
            spacing: velocity.delta * convention.vel_mm() * velocity_scale,
            center: velocity_center,
        },
    }
}

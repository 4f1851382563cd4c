use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convention::{AlignmentConvention, ConventionRegistry, ConventionSource};
use crate::formats::read_cube;
use crate::geometry::{self, Geometry, VelocityScale, resampled_length};
use crate::model::{HeaderView, PixelType, SkyAxis};

use super::Result;

/// What a conversion would produce for a cube, without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct CubeInfo {
    pub source: Option<PathBuf>,
    pub shape: Vec<usize>,
    pub pixel_type: PixelType,
    pub header: HeaderView,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub velocity_scale: f64,
    pub output_shape: [usize; 3],
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetEntry {
    pub name: String,
    #[serde(flatten)]
    pub convention: AlignmentConvention,
}

#[derive(Debug, Clone, Default)]
pub struct HeaderService {
    registry: ConventionRegistry,
}

impl HeaderService {
    pub fn new(registry: ConventionRegistry) -> Self {
        Self { registry }
    }

    pub fn inspect(
        &self,
        path: impl AsRef<Path>,
        velocity_scale: &VelocityScale,
        convention: Option<&ConventionSource>,
    ) -> Result<CubeInfo> {
        velocity_scale.validate()?;
        let convention = convention
            .map(|source| source.resolve(&self.registry))
            .transpose()?;
        let cube = read_cube(path)?;
        let header = cube.view()?;
        let (min, max) = cube.min_max().unzip();

        let scale = geometry::resolve(velocity_scale, &header)?;
        let velocity_length = match convention {
            None if scale != 1.0 => resampled_length(header.length(SkyAxis::Velocity), scale)?,
            _ => header.length(SkyAxis::Velocity),
        };
        let geometry = geometry::build(&header, scale, convention.as_ref())?;

        Ok(CubeInfo {
            source: cube.source.clone(),
            shape: cube.shape().to_vec(),
            pixel_type: cube.pixel_type,
            header,
            min,
            max,
            velocity_scale: scale,
            output_shape: [
                header.length(SkyAxis::Ra),
                velocity_length,
                header.length(SkyAxis::Dec),
            ],
            geometry,
        })
    }

    pub fn presets(&self) -> Vec<PresetEntry> {
        self.registry
            .iter()
            .map(|(name, convention)| PresetEntry {
                name: name.to_string(),
                convention: *convention,
            })
            .collect()
    }
}

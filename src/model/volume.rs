use std::str::FromStr;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::{CoreError, Result, VoxelKind};

/// NRRD data encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Raw,
    Gzip,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Gzip => "gzip",
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Encoding::Raw),
            "gzip" | "gz" => Ok(Encoding::Gzip),
            other => Err(format!("unsupported encoding `{other}` (expected raw or gzip)")),
        }
    }
}

/// Physical reference frame label written to `space:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpaceFrame {
    #[default]
    LeftPosteriorSuperior,
}

impl SpaceFrame {
    pub fn as_str(self) -> &'static str {
        match self {
            SpaceFrame::LeftPosteriorSuperior => "left-posterior-superior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left-posterior-superior" | "LPS" => Some(SpaceFrame::LeftPosteriorSuperior),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetadata {
    pub space: SpaceFrame,
    pub space_directions: [[f64; 3]; 3],
    pub kinds: [VoxelKind; 3],
    pub space_origin: [f64; 3],
    pub encoding: Encoding,
}

/// A voxel grid in viewer order (RA, Velocity, Dec) with its spatial metadata.
#[derive(Debug, Clone)]
pub struct Volume {
    pub data: Array3<f32>,
    pub metadata: VolumeMetadata,
}

impl Volume {
    pub fn new(data: Array3<f32>, metadata: VolumeMetadata) -> Result<Self> {
        if let Some(axis) = data.shape().iter().position(|size| *size == 0) {
            return Err(CoreError::ZeroSizedDimension { axis: axis + 1 });
        }
        Ok(Self { data, metadata })
    }

    pub fn shape(&self) -> [usize; 3] {
        let (first, second, third) = self.data.dim();
        [first, second, third]
    }
}

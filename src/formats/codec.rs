use std::path::Path;

use crate::model::{CubeF32, Volume};

use super::util::{is_fits_extension, is_nrrd_extension};
use super::{Result, read_cube, write_volume};

/// Source of decoded FITS cubes.
pub trait CubeReader {
    fn supports_extension(&self, extension: &str) -> bool;
    fn read(&self, path: &Path) -> Result<CubeF32>;
}

/// Sink for viewer-ordered voxel volumes.
pub trait VolumeWriter {
    fn supports_extension(&self, extension: &str) -> bool;
    fn write(&self, path: &Path, volume: &Volume) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCodec;

impl CubeReader for DefaultCodec {
    fn supports_extension(&self, extension: &str) -> bool {
        is_fits_extension(extension)
    }

    fn read(&self, path: &Path) -> Result<CubeF32> {
        read_cube(path)
    }
}

impl VolumeWriter for DefaultCodec {
    fn supports_extension(&self, extension: &str) -> bool {
        is_nrrd_extension(extension)
    }

    fn write(&self, path: &Path, volume: &Volume) -> Result<()> {
        write_volume(path, volume)
    }
}

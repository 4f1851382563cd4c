use std::path::{Path, PathBuf};

use ndarray::Axis;
use serde::Serialize;

use crate::formats::{read_cube, write_cube};
use crate::model::{CoreError, Cube, CubeF32, HeaderValue, SkyAxis};
use crate::ops;

use super::Result;

#[derive(Debug, Clone, Serialize)]
pub struct StripReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrimReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub vmin: usize,
    pub vmax: usize,
    pub velocity_length: usize,
    pub crpix3: f64,
}

/// FITS-to-FITS preparation steps run before a conversion.
#[derive(Debug, Default, Clone, Copy)]
pub struct CubeService;

impl CubeService {
    pub fn read(&self, path: impl AsRef<Path>) -> Result<CubeF32> {
        Ok(read_cube(path)?)
    }

    pub fn write(&self, path: impl AsRef<Path>, cube: &CubeF32, overwrite: bool) -> Result<()> {
        write_cube(path, cube, overwrite)?;
        Ok(())
    }

    /// Writes `input` without its degenerate fourth axis. An existing
    /// `output` is only replaced when `clobber` is set.
    pub fn strip_fourth_axis(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        clobber: bool,
    ) -> Result<StripReport> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let cube = self.read(input)?;
        let input_shape = cube.shape().to_vec();
        let stripped = ops::strip_fourth_axis(cube)?;
        self.write(output, &stripped, clobber)?;
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            "stripped fourth axis"
        );
        Ok(StripReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_shape,
            output_shape: stripped.shape().to_vec(),
        })
    }

    /// Keeps velocity planes `vmin..vmax` and moves `CRPIX3` so world
    /// coordinates stay put. Always overwrites `output`.
    pub fn trim_velocity(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        vmin: usize,
        vmax: usize,
    ) -> Result<TrimReport> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let cube = self.read(input)?;
        let pixel_type = cube.pixel_type;
        let (data, mut header) = cube.into_array3()?;
        let trimmed = ops::trim_velocity(&data, vmin..vmax)?;

        let key = SkyAxis::Velocity.keyword("CRPIX");
        let ref_pixel = header
            .get_f64(&key)
            .ok_or_else(|| CoreError::MissingAxis {
                axis: SkyAxis::Velocity,
                key: key.clone(),
            })?;
        let crpix3 = ref_pixel - vmin as f64;
        let velocity_length = trimmed.len_of(Axis(0));
        header.set(&key, HeaderValue::Real(crpix3));
        header.set(
            &SkyAxis::Velocity.keyword("NAXIS"),
            HeaderValue::Integer(velocity_length as i64),
        );

        let trimmed = Cube::new(trimmed.into_dyn(), header, pixel_type)?;
        self.write(output, &trimmed, true)?;
        tracing::info!(vmin, vmax, crpix3, "trimmed velocity axis");
        Ok(TrimReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            vmin,
            vmax,
            velocity_length,
            crpix3,
        })
    }
}

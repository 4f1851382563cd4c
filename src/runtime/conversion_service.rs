use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convention::{AlignmentConvention, ConventionRegistry, ConventionSource};
use crate::formats::{CubeReader, DefaultCodec, IoError, VolumeWriter, extension};
use crate::geometry::{self, Geometry, VelocityScale};
use crate::model::{Encoding, Volume};
use crate::ops;

use super::Result;

/// Parameters of one FITS to NRRD conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Multiplier applied to every sample; 1 leaves the data untouched.
    pub data_scale: f64,
    pub velocity_scale: VelocityScale,
    /// Without a convention the volume is centred on itself.
    pub convention: Option<ConventionSource>,
    pub encoding: Encoding,
}

impl ConvertRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            data_scale: 1.0,
            velocity_scale: VelocityScale::Unset,
            convention: None,
            encoding: Encoding::Raw,
        }
    }

    pub fn with_data_scale(mut self, data_scale: f64) -> Self {
        self.data_scale = data_scale;
        self
    }

    pub fn with_velocity_scale(mut self, velocity_scale: VelocityScale) -> Self {
        self.velocity_scale = velocity_scale;
        self
    }

    pub fn with_convention(mut self, convention: ConventionSource) -> Self {
        self.convention = Some(convention);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// (Velocity, Dec, RA) as stored in the FITS file.
    pub source_shape: [usize; 3],
    /// (RA, Velocity, Dec) as written.
    pub output_shape: [usize; 3],
    pub data_scale: f64,
    pub resampled: bool,
    pub encoding: Encoding,
    pub geometry: Geometry,
}

/// Runs the read, scale, resample, reorder, geometry and write steps of a
/// conversion. Nothing is written unless every earlier step succeeds.
#[derive(Debug, Clone)]
pub struct ConversionService<R = DefaultCodec, W = DefaultCodec> {
    reader: R,
    writer: W,
    registry: ConventionRegistry,
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new(DefaultCodec, DefaultCodec)
    }
}

impl<R, W> ConversionService<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            registry: ConventionRegistry::default(),
        }
    }

    pub fn with_registry(mut self, registry: ConventionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ConventionRegistry {
        &self.registry
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: CubeReader, W: VolumeWriter> ConversionService<R, W> {
    pub fn convert(&self, request: &ConvertRequest) -> Result<ConversionReport> {
        request.velocity_scale.validate()?;
        self.check_formats(&request.input, &request.output)?;
        let convention = self.resolve_convention(request.convention.as_ref())?;

        tracing::debug!(input = %request.input.display(), "reading cube");
        let cube = self.reader.read(&request.input)?;
        let header = cube.view()?;
        let (mut data, _) = cube.into_array3()?;
        let source_shape = header.source_shape();

        ops::apply_data_scale(&mut data, request.data_scale);
        let velocity_scale = geometry::resolve(&request.velocity_scale, &header)?;

        // A convention absorbs the scale into its voxel spacing instead.
        let resampled = convention.is_none() && velocity_scale != 1.0;
        if resampled {
            tracing::debug!(velocity_scale, "resampling velocity axis");
            data = ops::resample_velocity(&data, velocity_scale)?;
        }
        let data = ops::reorder(data);
        let geometry = geometry::build(&header, velocity_scale, convention.as_ref())?;

        tracing::info!(
            mode = ?geometry.mode,
            velocity_scale,
            space = geometry.space.as_str(),
            space_directions = ?geometry.space_directions,
            space_origin = ?geometry.space_origin,
            encoding = request.encoding.as_str(),
            "volume geometry"
        );

        let volume = Volume::new(data, geometry.metadata(request.encoding))?;
        let output_shape = volume.shape();
        self.writer.write(&request.output, &volume)?;
        tracing::debug!(output = %request.output.display(), "wrote volume");

        Ok(ConversionReport {
            input: request.input.clone(),
            output: request.output.clone(),
            source_shape,
            output_shape,
            data_scale: request.data_scale,
            resampled,
            encoding: request.encoding,
            geometry,
        })
    }

    fn check_formats(&self, input: &Path, output: &Path) -> Result<()> {
        let input_extension = extension(input)?;
        if !self.reader.supports_extension(&input_extension) {
            return Err(IoError::UnsupportedFormat(input_extension).into());
        }
        let output_extension = extension(output)?;
        if !self.writer.supports_extension(&output_extension) {
            return Err(IoError::UnsupportedFormat(output_extension).into());
        }
        Ok(())
    }

    fn resolve_convention(
        &self,
        source: Option<&ConventionSource>,
    ) -> Result<Option<AlignmentConvention>> {
        let Some(source) = source else {
            return Ok(None);
        };
        let convention = source.resolve(&self.registry)?;
        tracing::debug!(%source, ?convention, "using alignment convention");
        Ok(Some(convention))
    }
}

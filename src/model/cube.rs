use std::path::PathBuf;

use ndarray::{Array3, ArrayD, Ix3};

use super::{CoreError, FitsHeader, HeaderView, PixelType, Result};

/// A decoded FITS image: data in storage order (last FITS axis first) plus
/// the full header.
#[derive(Debug, Clone)]
pub struct Cube<T> {
    pub data: ArrayD<T>,
    pub header: FitsHeader,
    pub pixel_type: PixelType,
    pub source: Option<PathBuf>,
}

impl<T> Cube<T> {
    pub fn new(data: ArrayD<T>, header: FitsHeader, pixel_type: PixelType) -> Result<Self> {
        validate_shape(&header, data.shape())?;
        Ok(Self {
            data,
            header,
            pixel_type,
            source: None,
        })
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn view(&self) -> Result<HeaderView> {
        HeaderView::from_header(&self.header)
    }

    /// Splits the cube into a (Velocity, Dec, RA) array and its header.
    pub fn into_array3(self) -> Result<(Array3<T>, FitsHeader)> {
        let ndim = self.data.ndim();
        let data = self
            .data
            .into_dimensionality::<Ix3>()
            .map_err(|_| CoreError::UnsupportedAxes { ndim })?;
        Ok((data, self.header))
    }
}

impl Cube<f32> {
    /// Finite minimum and maximum; `None` when every sample is blank.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied().filter(|value| value.is_finite());
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for value in iter {
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
        }
        Some((min, max))
    }
}

pub type CubeF32 = Cube<f32>;

fn validate_shape(header: &FitsHeader, shape: &[usize]) -> Result<()> {
    let naxis = header
        .get_i64("NAXIS")
        .ok_or_else(|| CoreError::InvalidHeader("missing NAXIS".to_string()))?;
    if naxis < 0 || naxis as usize != shape.len() {
        return Err(CoreError::DimensionalityMismatch {
            data_ndim: shape.len(),
            meta_ndim: naxis.max(0) as usize,
        });
    }
    for (position, actual) in shape.iter().rev().enumerate() {
        let axis = position + 1;
        let declared = header
            .get_i64(&format!("NAXIS{axis}"))
            .ok_or_else(|| CoreError::InvalidHeader(format!("missing NAXIS{axis}")))?;
        if declared <= 0 || *actual == 0 {
            return Err(CoreError::ZeroSizedDimension { axis });
        }
        if declared as usize != *actual {
            return Err(CoreError::DimensionSizeMismatch {
                axis,
                data_size: *actual,
                meta_size: declared as usize,
            });
        }
    }
    Ok(())
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three axes of a spectral-line cube, in FITS header declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyAxis {
    Ra,
    Dec,
    Velocity,
}

impl SkyAxis {
    pub const ALL: [SkyAxis; 3] = [SkyAxis::Ra, SkyAxis::Dec, SkyAxis::Velocity];

    /// 1-based FITS axis number (`NAXISn`, `CRPIXn`, ...).
    pub fn fits_index(self) -> usize {
        match self {
            SkyAxis::Ra => 1,
            SkyAxis::Dec => 2,
            SkyAxis::Velocity => 3,
        }
    }

    /// Position in the decoded array. FITS stores axis 1 fastest, so the
    /// in-memory order is (Velocity, Dec, RA).
    pub fn source_position(self) -> usize {
        3 - self.fits_index()
    }

    /// Position in the viewer's (RA, Velocity, Dec) order.
    pub fn target_position(self) -> usize {
        match self {
            SkyAxis::Ra => 0,
            SkyAxis::Velocity => 1,
            SkyAxis::Dec => 2,
        }
    }

    pub fn keyword(self, prefix: &str) -> String {
        format!("{prefix}{}", self.fits_index())
    }

    pub fn name(self) -> &'static str {
        match self {
            SkyAxis::Ra => "RA",
            SkyAxis::Dec => "Dec",
            SkyAxis::Velocity => "Velocity",
        }
    }
}

impl fmt::Display for SkyAxis {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// NRRD per-axis kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VoxelKind {
    #[default]
    Domain,
}

impl VoxelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoxelKind::Domain => "domain",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "domain" => Some(VoxelKind::Domain),
            _ => None,
        }
    }
}

/// Sample type of the source FITS data unit (`BITPIX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelType {
    U8,
    I16,
    I32,
    I64,
    #[default]
    F32,
    F64,
}

impl PixelType {
    pub fn from_bitpix(bitpix: i64) -> Option<Self> {
        match bitpix {
            8 => Some(PixelType::U8),
            16 => Some(PixelType::I16),
            32 => Some(PixelType::I32),
            64 => Some(PixelType::I64),
            -32 => Some(PixelType::F32),
            -64 => Some(PixelType::F64),
            _ => None,
        }
    }

    pub fn bitpix(self) -> i64 {
        match self {
            PixelType::U8 => 8,
            PixelType::I16 => 16,
            PixelType::I32 => 32,
            PixelType::I64 => 64,
            PixelType::F32 => -32,
            PixelType::F64 => -64,
        }
    }

    pub fn byte_width(self) -> usize {
        (self.bitpix().unsigned_abs() / 8) as usize
    }

    pub fn is_integer(self) -> bool {
        self.bitpix() > 0
    }
}

use ndarray::Axis;

use crate::model::{CoreError, Cube, CubeF32, HeaderValue};

use super::{OpsError, Result};

const FOURTH_AXIS_KEYWORDS: [&str; 6] =
    ["NAXIS4", "CTYPE4", "CRVAL4", "CDELT4", "CRPIX4", "CUNIT4"];

/// Drops a length-1 fourth axis (usually Stokes) and its header keywords,
/// leaving a (Velocity, Dec, RA) cube. Three-axis cubes only lose any stray
/// fourth-axis keywords.
pub fn strip_fourth_axis(cube: CubeF32) -> Result<CubeF32> {
    let Cube {
        data,
        mut header,
        pixel_type,
        source,
    } = cube;
    let data = match data.ndim() {
        3 => data,
        4 if data.len_of(Axis(0)) == 1 => data.index_axis_move(Axis(0), 0),
        4 => {
            return Err(OpsError::UnsupportedLayout(format!(
                "fourth axis has length {}, only a degenerate axis can be stripped",
                data.len_of(Axis(0))
            )));
        }
        ndim => return Err(CoreError::UnsupportedAxes { ndim }.into()),
    };

    header.set("NAXIS", HeaderValue::Integer(3));
    for keyword in FOURTH_AXIS_KEYWORDS {
        header.remove(keyword);
    }
    let mut stripped = Cube::new(data, header, pixel_type)?;
    stripped.source = source;
    Ok(stripped)
}

mod api;
mod codec;
mod error;
mod fits;
mod nrrd;
mod util;

#[cfg(test)]
mod tests;

pub use api::{read_cube, read_cube_from_bytes, read_volume, write_cube, write_volume};
pub use codec::{CubeReader, DefaultCodec, VolumeWriter};
pub use error::{IoError, Result};
pub use fits::render_header;
pub use nrrd::nrrd_header;
pub(crate) use util::extension;

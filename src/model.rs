mod axis;
mod cube;
mod error;
mod header;
mod view;
mod volume;


pub use axis::{PixelType, SkyAxis, VoxelKind};
pub use cube::{Cube, CubeF32};
pub use error::{CoreError, Result};
pub use header::{Card, FitsHeader, HeaderValue};
pub use view::{AxisWcs, HeaderView};
pub use volume::{Encoding, SpaceFrame, Volume, VolumeMetadata};

mod builder;
mod error;
mod scale;


pub use builder::{Geometry, GeometryMode, build};
pub use error::{GeometryError, Result};
pub use scale::{VelocityScale, resampled_length, resolve};

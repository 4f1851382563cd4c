mod error;
mod intensity;
mod reorder;
mod resample;
mod strip;
mod trim;


pub use error::{OpsError, Result};
pub use intensity::apply_data_scale;
pub use reorder::{AxisPermutation, VIEWER_ORDER, reorder};
pub use resample::resample_velocity;
pub use strip::strip_fourth_axis;
pub use trim::trim_velocity;

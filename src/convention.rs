mod error;
mod io;
mod preset;
mod registry;
mod source;


pub use error::{ConventionError, Result};
pub use io::load_convention;
pub use preset::AlignmentConvention;
pub use registry::ConventionRegistry;
pub use source::ConventionSource;

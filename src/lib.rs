pub mod cli;
pub mod convention;
pub mod formats;
pub mod geometry;
pub mod model;
pub mod ops;
pub mod runtime;

pub use runtime::{ConversionReport, ConvertRequest, convert};

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}

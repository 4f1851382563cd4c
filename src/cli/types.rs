use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::convention::ConventionSource;
use crate::geometry::VelocityScale;
use crate::model::Encoding;
use crate::runtime::ConvertRequest;

#[derive(Debug, Parser)]
#[command(
    name = "fits2nrrd",
    version,
    about = "Convert RA/Dec/Velocity FITS cubes into NRRD voxel volumes"
)]
pub(super) struct Cli {
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Converts a FITS cube into an NRRD volume.
    Convert(ConvertArgs),
    /// Prints the header axes and the geometry a conversion would use.
    Info {
        input: PathBuf,
        #[arg(short = 'v', long, default_value = "auto")]
        velocity_scale: VelocityScale,
        #[arg(short = 'u', long)]
        convention: Option<ConventionSource>,
    },
    /// Removes a degenerate fourth (Stokes) axis.
    Strip {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        clobber: bool,
    },
    /// Keeps velocity planes vmin..vmax.
    Trim {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        vmin: usize,
        #[arg(long)]
        vmax: usize,
    },
    Presets,
}

#[derive(Debug, Args)]
pub(super) struct ConvertArgs {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// Multiply every sample by this factor.
    #[arg(short, long, default_value_t = 1.0)]
    data_scale: f64,
    /// `auto`, a positive factor, or `0`/`false` to keep the velocity axis.
    #[arg(short, long, default_value = "auto")]
    velocity_scale: VelocityScale,
    /// Preset name or preset file (YAML/JSON).
    #[arg(short = 'u', long)]
    convention: Option<ConventionSource>,
    #[arg(long, default_value = "raw")]
    encoding: Encoding,
}

impl ConvertArgs {
    pub(super) fn into_request(self) -> ConvertRequest {
        let mut request = ConvertRequest::new(self.input, self.output)
            .with_data_scale(self.data_scale)
            .with_velocity_scale(self.velocity_scale)
            .with_encoding(self.encoding);
        if let Some(convention) = self.convention {
            request = request.with_convention(convention);
        }
        request
    }
}

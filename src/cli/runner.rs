use clap::Parser;
use serde::Serialize;

use crate::runtime::AppContext;

use super::types::{Cli, Commands};

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let app = AppContext::new();

    match cli.command {
        Commands::Convert(args) => {
            let report = app
                .conversion_service()
                .convert(&args.into_request())
                .map_err(|error| error.to_string())?;
            print_json(&report)?;
        }
        Commands::Info {
            input,
            velocity_scale,
            convention,
        } => {
            let info = app
                .header_service()
                .inspect(&input, &velocity_scale, convention.as_ref())
                .map_err(|error| error.to_string())?;
            print_json(&info)?;
        }
        Commands::Strip {
            input,
            output,
            clobber,
        } => {
            let report = app
                .cube_service()
                .strip_fourth_axis(&input, &output, clobber)
                .map_err(|error| error.to_string())?;
            print_json(&report)?;
        }
        Commands::Trim {
            input,
            output,
            vmin,
            vmax,
        } => {
            let report = app
                .cube_service()
                .trim_velocity(&input, &output, vmin, vmax)
                .map_err(|error| error.to_string())?;
            print_json(&report)?;
        }
        Commands::Presets => {
            print_json(&app.header_service().presets())?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

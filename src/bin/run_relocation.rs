use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use rust_relocation::relocation::config::{CommandLineArgs, Config};
use rust_relocation::relocation::controller;
use rust_relocation::relocation::logging::init_logging;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();

    // Load and adapt config
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _guards = match init_logging(Path::new(&config.output().log_dir)) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Started with args: {:?}", args);

    match controller::run(&config) {
        Ok(summary) => {
            info!(
                "Relocated {} activities of {} persons",
                summary.stats.relocated, summary.stats.persons
            );
            println!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Relocation failed: {e}");
            eprintln!("Relocation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

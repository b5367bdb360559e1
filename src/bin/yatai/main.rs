//! Yatai command line

use std::{io, process::ExitCode};

use clap::Parser;
use tracing::error;

use crate::config::Cli;

mod commands;
mod config;
mod observability;

/// Yatai entry point
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{err}");
        }

        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match commands::run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");

            ExitCode::FAILURE
        }
    }
}

mod cli;
mod launch;

use std::{error::Error, io, process::ExitCode};

use clap::Parser;
use log::warn;
use tokio::signal;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = tokio::select! {
        res = launch::dispatch(cli.command) => res,
        _ = signal::ctrl_c() => {
            warn!("received ctrl-c, aborting the run");
            Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"))
        }
    };

    let Err(e) = result else {
        return ExitCode::SUCCESS;
    };

    eprintln!("pointcheck: {e}");
    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }

    ExitCode::FAILURE
}

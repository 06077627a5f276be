mod cli;
mod commands;
mod progress;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::engine_error;
use log::LevelFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_target = cli.log;
    engine_logging::initialize(log_target.into(), level);

    match commands::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            engine_error!("{:#}", err);
            if log_target == cli::LogTarget::File {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

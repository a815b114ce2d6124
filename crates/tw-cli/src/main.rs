//! Tidewater CLI - apply SQL schema scripts idempotently

use clap::Parser;
use std::process;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{apply, plan, verify};

#[tokio::main]
async fn main() -> process::ExitCode {
    // A missing .env file is normal
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match &cli.command {
        cli::Commands::Apply(args) => apply::execute(args, &cli.global).await,
        cli::Commands::Plan(args) => plan::execute(args, &cli.global).await,
        cli::Commands::Verify(args) => verify::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => process::ExitCode::from(*code),
            None => {
                eprintln!("Error: {err:#}");
                process::ExitCode::FAILURE
            }
        },
    }
}

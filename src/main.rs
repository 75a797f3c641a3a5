use clap::Parser;
use std::process::ExitCode;
use taskdeck::{LoggingConfig, cli, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(&LoggingConfig::from_env());

    let args = cli::Cli::parse();
    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

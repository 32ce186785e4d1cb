//! solar is a CLI tool to deploy solidity contracts and keep track of their addresses.

mod cli;
mod tasks;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use solar_core::SolarContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger. Stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    let ctx = SolarContext::new(cli.config());
    ctx.configure_address_format();

    tracing::debug!(
        environment = %ctx.config().environment,
        repo = %ctx.config().repository_path().display(),
        "Running command"
    );

    let result = tasks::run(&ctx, cli.command).await;

    // Let the reporter flush queued events, even when the command failed.
    ctx.shutdown().await;

    result
}

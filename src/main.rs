//! Overseer worker entry point.

use anyhow::{Context as _, Result};
use clap::Parser;

use overseer::cli::commands::{enqueue, examples, worker};
use overseer::cli::{Cli, Commands};
use overseer::infrastructure::config::ConfigLoader;
use overseer::infrastructure::logging::LoggerImpl;
use overseer::{build_context, Context};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load().context("failed to load configuration")?;
    cli.apply_overrides(&mut config)
        .context("invalid command-line override")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _logger = LoggerImpl::init(&config.logging).context("failed to initialize logger")?;

    let ctx: Context = build_context(&config)
        .await
        .context("failed to build runtime context")?;

    match cli.command {
        None => worker::run(config, ctx).await,
        Some(Commands::Enqueue { line }) => enqueue::run(ctx, line).await,
        Some(Commands::Examples) => examples::run(&ctx),
    }
}

//! tokengraph CLI entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tokengraph::cli::Cli;
use tokengraph::config;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = config::config()
            .map(|cfg| cfg.log_filter.clone())
            .unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(directive)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    cli.execute().await
}

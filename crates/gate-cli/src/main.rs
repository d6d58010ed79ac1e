mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Serve {
            host,
            port,
            database_url,
        } => commands::serve::handle(config, host, port, database_url).await,
        cli::Commands::Redact { text } => commands::redact::handle(&config, text),
        cli::Commands::Config => commands::config::handle(&config, cli.config.as_deref()),
    }
}

//! AquaLink CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aqualink_cli::{Cli, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,aqualink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.apply(CliConfig::from_env());

    tracing::debug!(
        primary = %config.primary_url,
        backup = ?config.backup_url,
        data_dir = %config.data_dir.display(),
        offline = cli.offline,
        "Configuration loaded"
    );

    let output = cli.run(&config).await?;
    print!("{output}");

    Ok(())
}

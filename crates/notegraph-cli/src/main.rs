use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use notegraph_cli::{cli::Cli, commands, Services};
use notegraph_config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "notegraph_cli={level},notegraph_pipeline={level},notegraph_surrealdb={level},\
             notegraph_enrichment={level},notegraph_parser={level},notegraph_config={level}",
            level = log_level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config_path();
    let config = ConfigLoader::load_from_file(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    debug!("Loaded config from {}", config_path.display());

    let services = Services::open(config).await?;
    let outcome = commands::run(&services, cli.command, cli.json).await;
    let closed = services.close().await;

    match (outcome, closed) {
        (Ok(rendered), closed) => {
            print!("{rendered}");
            closed
        }
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                error!("{:#}", close_err);
            }
            Err(e)
        }
    }
}

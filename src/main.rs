mod cli;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the MCP transport.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entity_tracker=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    entity_tracker::config::load_dotenv_file(Path::new(entity_tracker::config::DOTENV_FILE));

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Commands::Serve => {
            cli::run_mcp_server(&config).await?;
        }
        Commands::Dashboard { entity, task, out } => {
            cli::dashboard(&config, entity, task, out).await?;
        }
        Commands::Health => {
            cli::health(&config).await?;
        }
        Commands::Schema { table } => {
            cli::schema(&config, table).await?;
        }
        Commands::CheckEnv => {
            cli::check_env()?;
        }
    }

    Ok(())
}

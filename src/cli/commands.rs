use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use entity_tracker::config::{Config, ENV_SUPABASE_KEY, ENV_SUPABASE_SERVICE_KEY};
use entity_tracker::error::{Result, TrackerError};
use entity_tracker::gateway::HttpGateway;
use entity_tracker::mcp::tools::{self, SchemaInfoParams};
use entity_tracker::mcp::{self, ToolReply};
use entity_tracker::tracker::{render, Tracker};
use entity_tracker::SupabaseClient;

#[derive(Parser)]
#[command(name = "entity-tracker")]
#[command(about = "Entity, account and task tracker backed by Supabase")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Start the MCP server on stdio
    entity-tracker serve

    # Render the dashboard for one entity
    entity-tracker dashboard --entity 3f6c... --out dashboard.html

    # Check database connectivity
    entity-tracker health

    # List tables, or the columns of one table
    entity-tracker schema
    entity-tracker schema tasks

    # Show which configuration variables are set
    entity-tracker check-env
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Supabase project URL (overrides SUPABASE_URL)
    #[arg(long, global = true)]
    pub supabase_url: Option<String>,

    /// Supabase service key (overrides SUPABASE_SERVICE_KEY / SUPABASE_KEY)
    #[arg(long, global = true)]
    pub supabase_key: Option<String>,

    /// Tracker REST API base URL (overrides API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::from_env().with_overrides(
            self.supabase_url.clone(),
            self.supabase_key.clone(),
            self.api_url.clone(),
        )
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start MCP server on stdio
    Serve,

    /// Load all collections from the REST API and render the dashboard
    Dashboard {
        /// Entity to select
        #[arg(long)]
        entity: Option<String>,

        /// Task to select
        #[arg(long)]
        task: Option<String>,

        /// Write HTML to this file instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Check database connectivity
    Health,

    /// Show database schema
    Schema {
        /// Table to describe
        table: Option<String>,
    },

    /// Report which configuration variables are set
    CheckEnv,
}

pub async fn run_mcp_server(config: &Config) -> Result<()> {
    let server = mcp::server_from_config(config);

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down MCP server");
            on_signal.cancel();
        }
    });

    mcp::serve_stdio(server, shutdown).await
}

pub async fn dashboard(
    config: &Config,
    entity: Option<String>,
    task: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let gateway = HttpGateway::new(config.api_base_url.clone())?;
    let mut tracker = Tracker::new(gateway);

    let report = tracker.load_all().await;
    for (collection, error) in &report.failed {
        eprintln!("Failed to load {}: {}", collection.label(), error);
    }

    if let Some(id) = entity.as_deref() {
        if !tracker.state_mut().select_entity(id) {
            eprintln!("Entity not found: {}", id);
        }
    }
    if let Some(id) = task.as_deref() {
        if !tracker.state_mut().select_task(id) {
            eprintln!("Task not found: {}", id);
        }
    }

    match out {
        Some(path) => {
            tracker.state_mut().expire_notices(Instant::now());
            render::write_page(tracker.state(), &path)?;
            println!("Dashboard written to {}", path.display());
        }
        None => print!("{}", tracker.page()),
    }

    Ok(())
}

fn connect(config: &Config) -> Result<SupabaseClient> {
    let credentials = config.supabase().ok_or_else(|| {
        TrackerError::Config(format!(
            "Missing Supabase credentials: set SUPABASE_URL and {} (or {})",
            ENV_SUPABASE_SERVICE_KEY, ENV_SUPABASE_KEY
        ))
    })?;
    SupabaseClient::new(&credentials)
}

/// Success text goes to stdout; an error-flagged reply fails the command
/// with its own text.
fn reply_output(reply: ToolReply) -> anyhow::Result<String> {
    if reply.is_error {
        anyhow::bail!("{}", reply.text);
    }
    Ok(reply.text)
}

pub async fn health(config: &Config) -> anyhow::Result<()> {
    let db = connect(config)?;
    println!("{}", reply_output(tools::health_check(&db).await)?);
    Ok(())
}

pub async fn schema(config: &Config, table: Option<String>) -> anyhow::Result<()> {
    let db = connect(config)?;
    println!(
        "{}",
        reply_output(tools::schema_info(&db, SchemaInfoParams { table }).await)?
    );
    Ok(())
}

pub fn check_env() -> Result<()> {
    println!("Environment variables:");
    for (name, present) in Config::presence_report(|name| std::env::var(name).ok()) {
        println!("  {}: {}", name, if present { "✅ set" } else { "❌ not set" });
    }

    let config = Config::from_env();
    println!("\nAPI base URL: {}", config.api_base_url);
    if config.is_degraded() {
        println!("Supabase: not configured (MCP server will start without a client)");
    } else {
        println!("Supabase: configured");
    }
    Ok(())
}

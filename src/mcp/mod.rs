//! Tool-invocation adapter over the hosted database.

pub mod server;
pub mod tools;

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::db::SupabaseClient;
use crate::error::{Result, TrackerError};

pub use server::{tool_definitions, McpServer, ToolName};
pub use tools::{TableOperation, ToolReply};

/// Build the server from startup configuration. Missing or unusable
/// credentials leave the server running without a client.
pub fn server_from_config(config: &Config) -> McpServer {
    let Some(credentials) = config.supabase() else {
        tracing::error!("Missing Supabase credentials. Please check your environment.");
        return McpServer::degraded();
    };

    match SupabaseClient::new(&credentials) {
        Ok(client) => {
            tracing::info!("Supabase MCP server initialized for {}", credentials.url);
            McpServer::new(Some(Arc::new(client)))
        }
        Err(e) => {
            tracing::error!("Failed to initialize Supabase: {}", e);
            McpServer::degraded()
        }
    }
}

/// Serve over stdio until the host disconnects or `shutdown` is cancelled.
pub async fn serve_stdio(server: McpServer, shutdown: CancellationToken) -> Result<()> {
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server
        .serve_with_ct(transport, shutdown)
        .await
        .map_err(|e| TrackerError::Mcp(e.to_string()))?;

    tracing::info!("Entity tracker MCP server running on stdio");

    let reason = service
        .waiting()
        .await
        .map_err(|e| TrackerError::Mcp(e.to_string()))?;
    tracing::info!("MCP server stopped: {:?}", reason);

    Ok(())
}

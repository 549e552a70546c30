use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorCode, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::tools::{
    self, EmptyParams, QueryParams, SchemaInfoParams, TableOperationParams, ToolReply,
};
use crate::db::{Database, SupabaseClient};

/// Tool names exposed to the assistant host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    Query,
    TableOperation,
    SchemaInfo,
    HealthCheck,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::Query,
        ToolName::TableOperation,
        ToolName::SchemaInfo,
        ToolName::HealthCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Query => "supabase_query",
            ToolName::TableOperation => "supabase_table_operation",
            ToolName::SchemaInfo => "supabase_schema_info",
            ToolName::HealthCheck => "supabase_health_check",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    fn title(&self) -> &'static str {
        match self {
            ToolName::Query => "Supabase Query",
            ToolName::TableOperation => "Supabase Table Operation",
            ToolName::SchemaInfo => "Supabase Schema Info",
            ToolName::HealthCheck => "Supabase Health Check",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ToolName::Query => "Execute a SQL query on the Supabase database",
            ToolName::TableOperation => "Perform CRUD operations on Supabase tables",
            ToolName::SchemaInfo => "Get information about database schema",
            ToolName::HealthCheck => "Check Supabase connection and database status",
        }
    }

    fn input_schema(&self) -> Arc<serde_json::Map<String, serde_json::Value>> {
        match self {
            ToolName::Query => schema_for::<QueryParams>(),
            ToolName::TableOperation => schema_for::<TableOperationParams>(),
            ToolName::SchemaInfo => schema_for::<SchemaInfoParams>(),
            ToolName::HealthCheck => schema_for::<EmptyParams>(),
        }
    }
}

pub struct McpServer<D: Database = SupabaseClient> {
    /// `None` when startup ran without credentials.
    db: Option<Arc<D>>,
}

impl<D: Database> Clone for McpServer<D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<D: Database> McpServer<D> {
    pub fn new(db: Option<Arc<D>>) -> Self {
        Self { db }
    }

    pub fn connected(db: D) -> Self {
        Self::new(Some(Arc::new(db)))
    }

    pub fn degraded() -> Self {
        Self::new(None)
    }

    pub fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    /// Route one tool call. Adapter faults (unknown tool, missing client,
    /// malformed arguments) come back as `Err`; backend failures come back
    /// as an error-flagged reply.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<ToolReply, McpError> {
        let tool = ToolName::parse(name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", name),
                None,
            )
        })?;

        let db = self.db.as_deref().ok_or_else(|| {
            McpError::internal_error(
                "Supabase client not initialized. Check your credentials.",
                None,
            )
        })?;

        tracing::info!("tool call: {}", tool.as_str());

        let reply = match tool {
            ToolName::Query => tools::run_query(db, parse_args(arguments)?).await,
            ToolName::TableOperation => tools::table_operation(db, parse_args(arguments)?).await,
            ToolName::SchemaInfo => tools::schema_info(db, parse_args(arguments)?).await,
            ToolName::HealthCheck => tools::health_check(db).await,
        };

        Ok(reply)
    }
}

fn parse_args<T: DeserializeOwned>(
    arguments: Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<T, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

fn schema_for<T: JsonSchema>() -> Arc<serde_json::Map<String, serde_json::Value>> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema) {
        Ok(serde_json::Value::Object(map)) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

pub fn tool_definitions() -> Vec<Tool> {
    ToolName::ALL
        .iter()
        .map(|tool| Tool {
            name: tool.as_str().into(),
            title: Some(tool.title().to_string()),
            description: Some(tool.description().into()),
            input_schema: tool.input_schema(),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        })
        .collect()
}

impl From<ToolReply> for CallToolResult {
    fn from(reply: ToolReply) -> Self {
        if reply.is_error {
            CallToolResult::error(vec![Content::text(reply.text)])
        } else {
            CallToolResult::success(vec![Content::text(reply.text)])
        }
    }
}

impl<D: Database> ServerHandler for McpServer<D> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "entity-tracker".to_string(),
                title: Some("Entity Tracker Supabase MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Direct access to the entity tracker's Supabase database. \
                 Run SQL, perform table CRUD, inspect the schema and check connectivity."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: tool_definitions(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.dispatch(&request.name, request.arguments).await;
        if let Err(e) = &result {
            tracing::error!("[MCP Error] {}: {}", request.name, e.message);
        }
        result.map(CallToolResult::from)
    }
}

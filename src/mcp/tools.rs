//! Tool handlers. Backend failures are turned into reply text here and never
//! escape as protocol errors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{is_valid_table_name, Database, Filter, EXEC_SQL_FUNCTION, PRIMARY_TABLE};
use crate::error::TrackerError;

/// Text payload of one tool invocation plus its success/error status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

// === Params ===

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// SQL query to execute
    pub sql: String,
    /// Parameters for the query (optional)
    #[serde(default)]
    pub params: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TableOperation {
    Select,
    Insert,
    Update,
    Delete,
}

impl TableOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableOperation::Select => "select",
            TableOperation::Insert => "insert",
            TableOperation::Update => "update",
            TableOperation::Delete => "delete",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TableOperationParams {
    /// Table name
    pub table: String,
    /// Operation type
    pub operation: TableOperation,
    /// Data for insert/update operations
    #[serde(default)]
    pub data: Option<Value>,
    /// Filter conditions for select/update/delete operations
    #[serde(default)]
    pub filter: Option<Filter>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SchemaInfoParams {
    /// Specific table name (optional, returns all tables if not provided)
    #[serde(default)]
    pub table: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct EmptyParams {}

// === Handlers ===

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// `Error` for failures reported by the backend itself, `failed` for
/// everything that kept the call from completing.
fn failure_line(label: &str, err: &TrackerError) -> String {
    match err {
        TrackerError::Backend { message } => format!("❌ {} Error: {}", label, message),
        other => format!("❌ {} failed: {}", label, other),
    }
}

pub async fn run_query<D: Database>(db: &D, params: QueryParams) -> ToolReply {
    let args = json!({
        "query": params.sql,
        "parameters": params.params.unwrap_or_default(),
    });

    match db.rpc(EXEC_SQL_FUNCTION, args).await {
        Ok(data) => ToolReply::success(format!(
            "✅ Query executed successfully:\n\n{}",
            pretty(&data)
        )),
        Err(e) => {
            tracing::warn!("query failed: {}", e);
            ToolReply::failure(failure_line("Query", &e))
        }
    }
}

pub async fn table_operation<D: Database>(db: &D, params: TableOperationParams) -> ToolReply {
    let op = params.operation.as_str();
    let table = params.table.as_str();

    if !is_valid_table_name(table) {
        return ToolReply::failure(format!("❌ {} failed: invalid table name '{}'", op, table));
    }

    let filter = params.filter.unwrap_or_default();
    let result = match params.operation {
        TableOperation::Select => db.select(table, "*", &filter, None).await.map(Value::Array),
        TableOperation::Insert => match params.data.as_ref() {
            Some(data) => db.insert(table, data).await,
            None => return missing_data(op),
        },
        TableOperation::Update => match params.data.as_ref() {
            Some(data) => db.update(table, data, &filter).await,
            None => return missing_data(op),
        },
        TableOperation::Delete => db.delete(table, &filter).await,
    };

    match result {
        Ok(data) => ToolReply::success(format!(
            "✅ {} on {} successful:\n\n{}",
            op,
            table,
            pretty(&data)
        )),
        Err(e) => {
            tracing::warn!("{} on {} failed: {}", op, table, e);
            ToolReply::failure(failure_line(op, &e))
        }
    }
}

fn missing_data(op: &str) -> ToolReply {
    ToolReply::failure(format!("❌ {} failed: 'data' is required for {}", op, op))
}

#[derive(Debug, Deserialize)]
struct TableRow {
    table_name: String,
    #[serde(default)]
    table_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ColumnRow {
    column_name: String,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    is_nullable: Option<String>,
}

fn public_schema(extra: Option<(&str, &str)>) -> Filter {
    let mut filter = Filter::new();
    if let Some((column, value)) = extra {
        filter.insert(column.to_string(), json!(value));
    }
    filter.insert("table_schema".to_string(), json!("public"));
    filter
}

fn parse_rows<T: for<'de> Deserialize<'de>>(rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect()
}

/// Two-step catalog contract: list tables, then list columns for one table.
pub async fn schema_info<D: Database>(db: &D, params: SchemaInfoParams) -> ToolReply {
    let tables = match db
        .select(
            "information_schema.tables",
            "table_name,table_type",
            &public_schema(None),
            None,
        )
        .await
    {
        Ok(rows) => parse_rows::<TableRow>(rows),
        Err(e) => {
            tracing::warn!("schema lookup failed: {}", e);
            return ToolReply::failure(failure_line("Schema", &e));
        }
    };

    let mut response = String::from("📊 Database Schema:\n\n");

    let Some(table) = params.table else {
        for t in &tables {
            response.push_str(&format!(
                "- {} ({})\n",
                t.table_name,
                t.table_type.as_deref().unwrap_or("unknown")
            ));
        }
        return ToolReply::success(response);
    };

    let Some(info) = tables.iter().find(|t| t.table_name == table) else {
        return ToolReply::success(format!("❌ Table '{}' not found", table));
    };

    response.push_str(&format!(
        "Table: {}\nType: {}\n",
        info.table_name,
        info.table_type.as_deref().unwrap_or("unknown")
    ));

    match db
        .select(
            "information_schema.columns",
            "column_name,data_type,is_nullable",
            &public_schema(Some(("table_name", table.as_str()))),
            None,
        )
        .await
    {
        Ok(rows) => {
            let columns = parse_rows::<ColumnRow>(rows);
            if !columns.is_empty() {
                response.push_str("\nColumns:\n");
                for col in &columns {
                    response.push_str(&format!(
                        "  - {} ({}, {})\n",
                        col.column_name,
                        col.data_type.as_deref().unwrap_or("unknown"),
                        col.is_nullable.as_deref().unwrap_or("unknown")
                    ));
                }
            }
        }
        // Table info alone is still a useful answer.
        Err(e) => tracing::warn!("column lookup for {} failed: {}", table, e),
    }

    ToolReply::success(response)
}

pub async fn health_check<D: Database>(db: &D) -> ToolReply {
    match db
        .select(PRIMARY_TABLE, "count", &Filter::new(), Some(1))
        .await
    {
        Ok(_) => ToolReply::success(
            "✅ Supabase Connection: Healthy\n✅ Database: Accessible\n✅ Entities Table: Available",
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            ToolReply::failure(format!("❌ Health Check Failed: {}", e))
        }
    }
}

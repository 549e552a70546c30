pub mod supabase;

use std::future::Future;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::Result;
pub use supabase::SupabaseClient;

/// Column → value equality conditions, all of which must hold.
pub type Filter = serde_json::Map<String, Value>;

/// Table used as the liveness probe target.
pub const PRIMARY_TABLE: &str = "entities";

/// Stored procedure that executes raw SQL on the backend.
pub const EXEC_SQL_FUNCTION: &str = "exec_sql";

static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid table regex")
});

/// Plain or schema-qualified (`schema.table`) identifier.
pub fn is_valid_table_name(name: &str) -> bool {
    TABLE_NAME.is_match(name)
}

/// Operations the hosted database exposes to this process.
///
/// Implementations hold only connection configuration; every call is
/// independent.
pub trait Database: Send + Sync + 'static {
    fn rpc(&self, function: &str, args: Value) -> impl Future<Output = Result<Value>> + Send;

    fn select(
        &self,
        table: &str,
        columns: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Value>>> + Send;

    fn insert(&self, table: &str, data: &Value) -> impl Future<Output = Result<Value>> + Send;

    fn update(
        &self,
        table: &str,
        data: &Value,
        filter: &Filter,
    ) -> impl Future<Output = Result<Value>> + Send;

    fn delete(&self, table: &str, filter: &Filter) -> impl Future<Output = Result<Value>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert!(is_valid_table_name("entities"));
        assert!(is_valid_table_name("task_steps"));
        assert!(is_valid_table_name("information_schema.tables"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("1entities"));
        assert!(!is_valid_table_name("entities;drop"));
        assert!(!is_valid_table_name("a.b.c"));
        assert!(!is_valid_table_name("../rpc/exec_sql"));
    }
}

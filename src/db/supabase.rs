//! PostgREST client for a hosted Supabase project.

use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::Value;

use super::{Database, Filter};
use crate::config::SupabaseCredentials;
use crate::error::{Result, TrackerError};

pub struct SupabaseClient {
    rest_url: String,
    key: String,
    http: reqwest::Client,
}

/// Error body returned by PostgREST on a failed call.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl SupabaseClient {
    pub fn new(credentials: &SupabaseCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TrackerError::Transport(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            rest_url: format!("{}/rest/v1", credentials.url.trim().trim_end_matches('/')),
            key: credentials.key.clone(),
            http,
        })
    }

    /// `schema.table` addresses a non-default schema through the profile
    /// headers; the path only ever carries the bare table name.
    fn target(&self, table: &str) -> (String, Option<String>) {
        match table.split_once('.') {
            Some((schema, name)) => (
                format!("{}/{}", self.rest_url, name),
                Some(schema.to_string()),
            ),
            None => (format!("{}/{}", self.rest_url, table), None),
        }
    }

    fn read(&self, table: &str) -> RequestBuilder {
        let (url, schema) = self.target(table);
        let builder = self.authorized(self.http.get(url));
        match schema {
            Some(schema) => builder.header("Accept-Profile", schema),
            None => builder,
        }
    }

    fn write(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        let (url, schema) = self.target(table);
        let builder = self
            .authorized(self.http.request(method, url))
            .header("Prefer", "return=representation");
        match schema {
            Some(schema) => builder.header("Content-Profile", schema),
            None => builder,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.key).bearer_auth(&self.key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder
            .send()
            .await
            .map_err(|e| TrackerError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TrackerError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(backend_error(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// PostgREST filter pairs: `col=eq.value`, or `col=is.null` for nulls.
pub(crate) fn filter_pairs(filter: &Filter) -> Vec<(String, String)> {
    filter
        .iter()
        .map(|(column, value)| {
            let condition = match value {
                Value::Null => "is.null".to_string(),
                Value::String(s) => format!("eq.{}", s),
                other => format!("eq.{}", other),
            };
            (column.clone(), condition)
        })
        .collect()
}

fn backend_error(status: u16, body: &str) -> TrackerError {
    let message = match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError {
            message: Some(message),
            details,
            hint,
        }) => {
            let mut message = message;
            if let Some(details) = details.filter(|d| !d.is_empty()) {
                message.push_str(&format!(" ({})", details));
            }
            if let Some(hint) = hint.filter(|h| !h.is_empty()) {
                message.push_str(&format!(" Hint: {}", hint));
            }
            message
        }
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {}", status),
    };
    TrackerError::backend(message)
}

impl Database for SupabaseClient {
    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let url = format!("{}/rpc/{}", self.rest_url, function);
        tracing::debug!("rpc {}", function);
        let builder = self.authorized(self.http.post(url)).json(&args);
        self.send(builder).await
    }

    async fn select(
        &self,
        table: &str,
        columns: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let mut query = vec![("select".to_string(), columns.to_string())];
        query.extend(filter_pairs(filter));
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        tracing::debug!("select {} from {}", columns, table);
        let value = self.send(self.read(table).query(&query)).await?;
        match value {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn insert(&self, table: &str, data: &Value) -> Result<Value> {
        tracing::debug!("insert into {}", table);
        let builder = self.write(reqwest::Method::POST, table).json(data);
        self.send(builder).await
    }

    async fn update(&self, table: &str, data: &Value, filter: &Filter) -> Result<Value> {
        tracing::debug!("update {}", table);
        let builder = self
            .write(reqwest::Method::PATCH, table)
            .query(&filter_pairs(filter))
            .json(data);
        self.send(builder).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Value> {
        tracing::debug!("delete from {}", table);
        let builder = self
            .write(reqwest::Method::DELETE, table)
            .query(&filter_pairs(filter));
        self.send(builder).await
    }
}

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod mcp;
pub mod models;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use config::{Config, SupabaseCredentials};
pub use db::{Database, Filter, SupabaseClient};
pub use error::{Result, TrackerError};
pub use gateway::{Gateway, HttpGateway, Method};
pub use mcp::{McpServer, TableOperation, ToolName, ToolReply};
pub use models::{
    Account, AccountInput, Entity, EntityInput, EntityStatus, Priority, StepDraft, Task,
    TaskInput, TaskStatus, TaskStep, TaskStepInput,
};
pub use tracker::{AppState, Collection, LoadReport, Tracker};

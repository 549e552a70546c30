use std::fmt;

use serde::{Deserialize, Serialize};

// === Status vocabularies ===

/// Lifecycle status shared by tasks and task steps.
///
/// Unrecognised wire values are kept verbatim in `Other` so that a row with a
/// status this build does not know about still loads and renders. A `null`
/// column reads as the default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Other(s) => s,
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "warning",
            TaskStatus::InProgress => "info",
            TaskStatus::Completed => "success",
            TaskStatus::Cancelled => "danger",
            TaskStatus::Other(_) => "secondary",
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => TaskStatus::Pending,
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "cancelled" => TaskStatus::Cancelled,
            _ => TaskStatus::Other(s),
        }
    }
}

impl From<Option<String>> for TaskStatus {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum EntityStatus {
    #[default]
    Active,
    Inactive,
    Other(String),
}

impl EntityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Inactive => "inactive",
            EntityStatus::Other(s) => s,
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            EntityStatus::Active => "success",
            EntityStatus::Inactive | EntityStatus::Other(_) => "secondary",
        }
    }
}

impl From<String> for EntityStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => EntityStatus::Active,
            "inactive" => EntityStatus::Inactive,
            _ => EntityStatus::Other(s),
        }
    }
}

impl From<Option<String>> for EntityStatus {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl From<EntityStatus> for String {
    fn from(status: EntityStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
            Priority::Other(s) => s,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Other(s),
        }
    }
}

impl From<Option<String>> for Priority {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

// === Read models ===

/// A business or legal entity. Top-level grouping key for accounts and tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_name: String,
    #[serde(default)]
    pub ein: Option<String>,
    #[serde(default)]
    pub date_of_formation: Option<String>,
    #[serde(default)]
    pub registered_address: Option<String>,
    #[serde(default)]
    pub state_of_formation: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Credential/profile record. The secret is write-only and never part of the
/// read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    pub account_name: String,
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(alias = "task_name")]
    pub task_title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub steps: Vec<TaskStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStep {
    pub id: String,
    pub task_id: String,
    #[serde(alias = "step_description")]
    pub step_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub step_order: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: TaskStatus,
}

// === Input payloads ===

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityInput {
    pub entity_name: String,
    pub ein: Option<String>,
    pub date_of_formation: Option<String>,
    pub registered_address: Option<String>,
    pub state_of_formation: Option<String>,
    pub entity_type: Option<String>,
    pub status: EntityStatus,
}

impl EntityInput {
    pub fn normalized(self) -> Self {
        Self {
            entity_name: self.entity_name.trim().to_string(),
            ein: blank_to_none(self.ein),
            date_of_formation: blank_to_none(self.date_of_formation),
            registered_address: blank_to_none(self.registered_address),
            state_of_formation: blank_to_none(self.state_of_formation),
            entity_type: blank_to_none(self.entity_type),
            status: self.status,
        }
    }
}

impl From<&Entity> for EntityInput {
    fn from(entity: &Entity) -> Self {
        Self {
            entity_name: entity.entity_name.clone(),
            ein: entity.ein.clone(),
            date_of_formation: entity.date_of_formation.clone(),
            registered_address: entity.registered_address.clone(),
            state_of_formation: entity.state_of_formation.clone(),
            entity_type: entity.entity_type.clone(),
            status: entity.status.clone(),
        }
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInput {
    pub entity_id: Option<String>,
    pub account_name: String,
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub login_url: Option<String>,
    pub account_type: Option<String>,
    pub notes: Option<String>,
}

impl AccountInput {
    pub fn normalized(self) -> Self {
        Self {
            entity_id: blank_to_none(self.entity_id),
            account_name: self.account_name.trim().to_string(),
            username: blank_to_none(self.username),
            // Leading/trailing whitespace can be part of a secret.
            password: self.password.filter(|p| !p.is_empty()),
            login_url: blank_to_none(self.login_url),
            account_type: blank_to_none(self.account_type),
            notes: blank_to_none(self.notes),
        }
    }
}

impl fmt::Debug for AccountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountInput")
            .field("entity_id", &self.entity_id)
            .field("account_name", &self.account_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("login_url", &self.login_url)
            .field("account_type", &self.account_type)
            .field("notes", &self.notes)
            .finish()
    }
}

/// Edit forms never carry the stored secret back to the user.
impl From<&Account> for AccountInput {
    fn from(account: &Account) -> Self {
        Self {
            entity_id: account.entity_id.clone(),
            account_name: account.account_name.clone(),
            username: account.username.clone(),
            password: None,
            login_url: account.login_url.clone(),
            account_type: account.account_type.clone(),
            notes: account.notes.clone(),
        }
    }
}

/// Step embedded in a task write. Ordering starts at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDraft {
    pub step_order: u32,
    pub step_description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub entity_id: Option<String>,
    pub account_id: Option<String>,
    pub task_title: String,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepDraft>,
}

impl TaskInput {
    /// Replace the embedded steps with the given descriptions, in order.
    /// Blank descriptions are dropped before numbering.
    pub fn with_step_descriptions<I, S>(mut self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.steps = descriptions
            .into_iter()
            .filter_map(|d| {
                let d = d.as_ref().trim();
                (!d.is_empty()).then(|| d.to_string())
            })
            .enumerate()
            .map(|(i, step_description)| StepDraft {
                step_order: i as u32 + 1,
                step_description,
                completed: false,
            })
            .collect();
        self
    }

    pub fn normalized(self) -> Self {
        Self {
            entity_id: blank_to_none(self.entity_id),
            account_id: blank_to_none(self.account_id),
            task_title: self.task_title.trim().to_string(),
            description: blank_to_none(self.description),
            deadline: blank_to_none(self.deadline),
            priority: self.priority,
            status: self.status,
            steps: self.steps,
        }
    }
}

impl From<&Task> for TaskInput {
    fn from(task: &Task) -> Self {
        let mut steps: Vec<&TaskStep> = task.steps.iter().collect();
        steps.sort_by_key(|s| s.step_order.unwrap_or(u32::MAX));

        Self {
            entity_id: task.entity_id.clone(),
            account_id: task.account_id.clone(),
            task_title: task.task_title.clone(),
            description: task.description.clone(),
            deadline: task.deadline.clone(),
            priority: task.priority.clone(),
            status: task.status.clone(),
            steps: Vec::new(),
        }
        .with_step_descriptions(steps.into_iter().map(|s| s.step_name.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStepInput {
    pub task_id: String,
    pub step_name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

impl TaskStepInput {
    pub fn normalized(self) -> Self {
        Self {
            task_id: self.task_id.trim().to_string(),
            step_name: self.step_name.trim().to_string(),
            description: blank_to_none(self.description),
            status: self.status,
        }
    }
}

impl From<&TaskStep> for TaskStepInput {
    fn from(step: &TaskStep) -> Self {
        Self {
            task_id: step.task_id.clone(),
            step_name: step.step_name.clone(),
            description: step.description.clone(),
            status: step.status.clone(),
        }
    }
}

//! Tracker operations: loads, saves and deletes against the REST backend.
//!
//! Every failed backend call is logged, surfaced as a danger notice and still
//! returned to the caller.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::render;
use super::state::{AppState, Collection, FormDraft, ModalKind, NoticeKind};
use crate::error::{Result, TrackerError};
use crate::gateway::{Gateway, Method};
use crate::models::{
    Account, AccountInput, Entity, EntityInput, Task, TaskInput, TaskStep, TaskStepInput,
};

/// Outcome of [`Tracker::load_all`]. Loads are independent; each failure is
/// recorded with its collection.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<Collection>,
    pub failed: Vec<(Collection, String)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, collection: Collection, result: &Result<T>) {
        match result {
            Ok(_) => self.loaded.push(collection),
            Err(e) => self.failed.push((collection, e.to_string())),
        }
    }
}

async fn fetch<G: Gateway, T: DeserializeOwned>(gateway: &G, collection: Collection) -> Result<Vec<T>> {
    match gateway.get(collection.path()).await? {
        Value::Null => Ok(Vec::new()),
        value => Ok(serde_json::from_value(value)?),
    }
}

pub struct Tracker<G: Gateway> {
    gateway: G,
    state: AppState,
}

impl<G: Gateway> Tracker<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: AppState::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn report_failure(&mut self, context: &str, e: &TrackerError) {
        tracing::error!("{}: {}", context, e);
        self.state
            .push_notice(NoticeKind::Danger, format!("Error: {}", e));
    }

    async fn call(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let result = self.gateway.request(method, path, body).await;
        if let Err(e) = &result {
            self.report_failure(&format!("API call failed: {} {}", method.as_str(), path), e);
        }
        result
    }

    /// Drop expired notices, then render the full page.
    pub fn page(&mut self) -> String {
        self.state.expire_notices(Instant::now());
        render::page(&self.state)
    }

    // === Loads ===

    /// Fetch all four collections concurrently. A failed load leaves its
    /// collection as it was and does not affect the others.
    pub async fn load_all(&mut self) -> LoadReport {
        let (entities, accounts, tasks, steps) = tokio::join!(
            fetch::<G, Entity>(&self.gateway, Collection::Entities),
            fetch::<G, Account>(&self.gateway, Collection::Accounts),
            fetch::<G, Task>(&self.gateway, Collection::Tasks),
            fetch::<G, TaskStep>(&self.gateway, Collection::TaskSteps),
        );

        let mut report = LoadReport::default();
        report.record(Collection::Entities, &entities);
        report.record(Collection::Accounts, &accounts);
        report.record(Collection::Tasks, &tasks);
        report.record(Collection::TaskSteps, &steps);

        match entities {
            Ok(rows) => self.state.replace_entities(rows),
            Err(e) => self.load_failed(Collection::Entities, &e),
        }
        match accounts {
            Ok(rows) => self.state.replace_accounts(rows),
            Err(e) => self.load_failed(Collection::Accounts, &e),
        }
        match tasks {
            Ok(rows) => self.state.replace_tasks(rows),
            Err(e) => self.load_failed(Collection::Tasks, &e),
        }
        match steps {
            Ok(rows) => self.state.replace_task_steps(rows),
            Err(e) => self.load_failed(Collection::TaskSteps, &e),
        }

        report
    }

    fn load_failed(&mut self, collection: Collection, e: &TrackerError) {
        tracing::warn!("Error loading {}: {}", collection.label(), e);
        self.state
            .push_notice(NoticeKind::Danger, format!("Error: {}", e));
    }

    async fn load<T: DeserializeOwned>(&mut self, collection: Collection) -> Result<Vec<T>> {
        let result = fetch::<G, T>(&self.gateway, collection).await;
        if let Err(e) = &result {
            self.load_failed(collection, e);
        }
        result
    }

    pub async fn load_entities(&mut self) -> Result<()> {
        let rows = self.load(Collection::Entities).await?;
        self.state.replace_entities(rows);
        Ok(())
    }

    pub async fn load_accounts(&mut self) -> Result<()> {
        let rows = self.load(Collection::Accounts).await?;
        self.state.replace_accounts(rows);
        Ok(())
    }

    pub async fn load_tasks(&mut self) -> Result<()> {
        let rows = self.load(Collection::Tasks).await?;
        self.state.replace_tasks(rows);
        Ok(())
    }

    pub async fn load_task_steps(&mut self) -> Result<()> {
        let rows = self.load(Collection::TaskSteps).await?;
        self.state.replace_task_steps(rows);
        Ok(())
    }

    async fn reload(&mut self, collection: Collection) {
        // Failures are already surfaced as notices.
        let _ = match collection {
            Collection::Entities => self.load_entities().await,
            Collection::Accounts => self.load_accounts().await,
            Collection::Tasks => self.load_tasks().await,
            Collection::TaskSteps => self.load_task_steps().await,
        };
    }

    // === Saves ===

    /// PUT to the record path when the open modal edits an existing record,
    /// POST to the collection otherwise. The modal stays open on failure.
    async fn save<T: Serialize>(&mut self, kind: ModalKind, input: &T) -> Result<Value> {
        let collection = kind.collection();
        let body = serde_json::to_value(input)?;
        let (method, path) = match self.state.editing_id(kind) {
            Some(id) => (Method::Put, collection.item_path(id)),
            None => (Method::Post, collection.path().to_string()),
        };
        let verb = if method == Method::Put { "updated" } else { "created" };

        let saved = self.call(method, &path, Some(&body)).await?;

        self.reload(collection).await;
        self.state.close_modal();
        self.state.push_notice(
            NoticeKind::Success,
            format!("{} {} successfully", kind.label(), verb),
        );
        Ok(saved)
    }

    pub async fn save_entity(&mut self, input: EntityInput) -> Result<Value> {
        self.save(ModalKind::Entity, &input.normalized()).await
    }

    pub async fn save_account(&mut self, input: AccountInput) -> Result<Value> {
        self.save(ModalKind::Account, &input.normalized()).await
    }

    /// Steps embedded in the payload are written by the backend as well, so
    /// the step collection is refreshed too.
    pub async fn save_task(&mut self, input: TaskInput) -> Result<Value> {
        let input = input.normalized();
        let has_steps = !input.steps.is_empty();
        let saved = self.save(ModalKind::Task, &input).await?;
        if has_steps {
            self.reload(Collection::TaskSteps).await;
        }
        Ok(saved)
    }

    /// A step always belongs to exactly one task; incomplete forms are
    /// refused before anything is sent.
    pub async fn save_task_step(&mut self, input: TaskStepInput) -> Result<Value> {
        let input = input.normalized();
        let missing = if input.task_id.is_empty() {
            Some("Please select a task for this step")
        } else if input.step_name.is_empty() {
            Some("Please enter a step name")
        } else {
            None
        };
        if let Some(message) = missing {
            self.warn(message);
            return Err(TrackerError::Validation(message.to_string()));
        }
        self.save(ModalKind::TaskStep, &input).await
    }

    // === Deletes ===

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<()> {
        self.call(Method::Delete, &collection.item_path(id), None)
            .await?;
        if self.state.selected_id(collection) == Some(id) {
            self.state.clear_selection(collection);
        }
        self.reload(collection).await;
        self.state.push_notice(
            NoticeKind::Success,
            format!("Deleted from {}", collection.label()),
        );
        Ok(())
    }

    pub async fn delete_entity(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::Entities, id).await
    }

    pub async fn delete_account(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::Accounts, id).await
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::Tasks, id).await
    }

    pub async fn delete_task_step(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::TaskSteps, id).await
    }

    // === Modal entry points ===

    fn warn(&mut self, message: &str) {
        self.state.push_notice(NoticeKind::Warning, message);
    }

    pub fn new_entity(&mut self) {
        self.state
            .open_modal(FormDraft::Entity(EntityInput::default()), None);
    }

    pub fn new_account(&mut self) {
        let input = AccountInput {
            entity_id: self.state.selected_entity().map(|e| e.id.clone()),
            ..Default::default()
        };
        self.state.open_modal(FormDraft::Account(input), None);
    }

    pub fn new_task(&mut self) {
        let input = TaskInput {
            entity_id: self.state.selected_entity().map(|e| e.id.clone()),
            ..Default::default()
        };
        self.state.open_modal(FormDraft::Task(input), None);
    }

    pub fn new_task_step(&mut self) {
        let input = TaskStepInput {
            task_id: self
                .state
                .selected_task()
                .map(|t| t.id.clone())
                .unwrap_or_default(),
            ..Default::default()
        };
        self.state.open_modal(FormDraft::TaskStep(input), None);
    }

    pub fn edit_selected_entity(&mut self) -> bool {
        let Some(entity) = self.state.selected_entity() else {
            self.warn("Please select an entity first");
            return false;
        };
        let (draft, id) = (FormDraft::Entity(EntityInput::from(entity)), entity.id.clone());
        self.state.open_modal(draft, Some(id));
        true
    }

    pub fn edit_selected_account(&mut self) -> bool {
        let Some(account) = self.state.selected_account() else {
            self.warn("Please select an account first");
            return false;
        };
        let (draft, id) = (FormDraft::Account(AccountInput::from(account)), account.id.clone());
        self.state.open_modal(draft, Some(id));
        true
    }

    pub fn edit_selected_task(&mut self) -> bool {
        let Some(task) = self.state.selected_task() else {
            self.warn("Please select a task first");
            return false;
        };
        let (draft, id) = (FormDraft::Task(TaskInput::from(task)), task.id.clone());
        self.state.open_modal(draft, Some(id));
        true
    }

    pub fn edit_selected_task_step(&mut self) -> bool {
        let Some(step) = self.state.selected_step() else {
            self.warn("Please select a task step first");
            return false;
        };
        let (draft, id) = (FormDraft::TaskStep(TaskStepInput::from(step)), step.id.clone());
        self.state.open_modal(draft, Some(id));
        true
    }
}

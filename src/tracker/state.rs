//! Front-end application state.
//!
//! Fields are private; hosts change state only through the methods below and
//! read it through the accessors and filtered views.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::models::{
    Account, AccountInput, Entity, EntityInput, Task, TaskInput, TaskStep, TaskStepInput,
};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Backend collection and its REST path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Entities,
    Accounts,
    Tasks,
    TaskSteps,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Entities => "/entities",
            Collection::Accounts => "/accounts",
            Collection::Tasks => "/tasks",
            Collection::TaskSteps => "/task-steps",
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Collection::Entities => "entities",
            Collection::Accounts => "accounts",
            Collection::Tasks => "tasks",
            Collection::TaskSteps => "task steps",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Entities,
    Accounts,
    Tasks,
    TaskSteps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Entity,
    Account,
    Task,
    TaskStep,
}

impl ModalKind {
    pub fn collection(&self) -> Collection {
        match self {
            ModalKind::Entity => Collection::Entities,
            ModalKind::Account => Collection::Accounts,
            ModalKind::Task => Collection::Tasks,
            ModalKind::TaskStep => Collection::TaskSteps,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModalKind::Entity => "Entity",
            ModalKind::Account => "Account",
            ModalKind::Task => "Task",
            ModalKind::TaskStep => "Task step",
        }
    }
}

/// Initial form contents of an open modal.
#[derive(Debug, Clone, PartialEq)]
pub enum FormDraft {
    Entity(EntityInput),
    Account(AccountInput),
    Task(TaskInput),
    TaskStep(TaskStepInput),
}

impl FormDraft {
    pub fn kind(&self) -> ModalKind {
        match self {
            FormDraft::Entity(_) => ModalKind::Entity,
            FormDraft::Account(_) => ModalKind::Account,
            FormDraft::Task(_) => ModalKind::Task,
            FormDraft::TaskStep(_) => ModalKind::TaskStep,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    /// Present when editing an existing record, absent when creating.
    pub editing_id: Option<String>,
    pub draft: FormDraft,
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        self.draft.kind()
    }

    pub fn title(&self) -> String {
        match self.editing_id {
            Some(_) => format!("Edit {}", self.kind().label()),
            None => format!("Add New {}", self.kind().label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: Instant,
}

#[derive(Debug, Default)]
pub struct AppState {
    entities: Vec<Entity>,
    accounts: Vec<Account>,
    tasks: Vec<Task>,
    task_steps: Vec<TaskStep>,

    selected_entity: Option<String>,
    selected_account: Option<String>,
    selected_task: Option<String>,
    selected_step: Option<String>,

    active_tab: Tab,
    modal: Option<Modal>,
    notices: Vec<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // === Collections ===

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_steps(&self) -> &[TaskStep] {
        &self.task_steps
    }

    pub fn replace_entities(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
        if let Some(id) = self.selected_entity.clone() {
            if self.entity(&id).is_none() {
                self.selected_entity = None;
            }
        }
    }

    pub fn replace_accounts(&mut self, accounts: Vec<Account>) {
        self.accounts = accounts;
        if let Some(id) = self.selected_account.clone() {
            if self.account(&id).is_none() {
                self.selected_account = None;
            }
        }
    }

    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        if let Some(id) = self.selected_task.clone() {
            if self.task(&id).is_none() {
                self.selected_task = None;
            }
        }
    }

    pub fn replace_task_steps(&mut self, steps: Vec<TaskStep>) {
        self.task_steps = steps;
        if let Some(id) = self.selected_step.clone() {
            if self.task_step(&id).is_none() {
                self.selected_step = None;
            }
        }
    }

    // === Lookups (linear scans) ===

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_step(&self, id: &str) -> Option<&TaskStep> {
        self.task_steps.iter().find(|s| s.id == id)
    }

    pub fn entity_name_for(&self, entity_id: Option<&str>) -> &str {
        entity_id
            .and_then(|id| self.entity(id))
            .map(|e| e.entity_name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn account_name_for(&self, account_id: Option<&str>) -> &str {
        account_id
            .and_then(|id| self.account(id))
            .map(|a| a.account_name.as_str())
            .unwrap_or("-")
    }

    pub fn task_title_for(&self, task_id: &str) -> &str {
        self.task(task_id)
            .map(|t| t.task_title.as_str())
            .unwrap_or("Unknown")
    }

    /// Account choices for the task form once an entity is picked.
    pub fn accounts_for_entity<'a>(&'a self, entity_id: &'a str) -> impl Iterator<Item = &'a Account> {
        self.accounts
            .iter()
            .filter(move |a| a.entity_id.as_deref() == Some(entity_id))
    }

    // === Filtered views ===

    pub fn visible_accounts(&self) -> Vec<&Account> {
        match self.selected_entity.as_deref() {
            Some(entity_id) => self.accounts_for_entity(entity_id).collect(),
            None => self.accounts.iter().collect(),
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        match self.selected_entity.as_deref() {
            Some(entity_id) => self
                .tasks
                .iter()
                .filter(|t| t.entity_id.as_deref() == Some(entity_id))
                .collect(),
            None => self.tasks.iter().collect(),
        }
    }

    pub fn visible_steps(&self) -> Vec<&TaskStep> {
        let mut steps: Vec<&TaskStep> = match self.selected_task.as_deref() {
            Some(task_id) => self
                .task_steps
                .iter()
                .filter(|s| s.task_id == task_id)
                .collect(),
            None => self.task_steps.iter().collect(),
        };
        // Stable: unordered steps keep backend order after ordered ones.
        steps.sort_by_key(|s| s.step_order.unwrap_or(u32::MAX));
        steps
    }

    // === Selection ===

    pub fn selected_entity(&self) -> Option<&Entity> {
        self.selected_entity.as_deref().and_then(|id| self.entity(id))
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.selected_account.as_deref().and_then(|id| self.account(id))
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task.as_deref().and_then(|id| self.task(id))
    }

    pub fn selected_step(&self) -> Option<&TaskStep> {
        self.selected_step.as_deref().and_then(|id| self.task_step(id))
    }

    /// Narrow accounts and tasks to one entity and switch to the accounts tab.
    /// Unknown ids leave the state untouched.
    pub fn select_entity(&mut self, entity_id: &str) -> bool {
        if self.entity(entity_id).is_none() {
            return false;
        }
        self.selected_entity = Some(entity_id.to_string());
        self.active_tab = Tab::Accounts;
        true
    }

    pub fn select_account(&mut self, account_id: &str) -> bool {
        if self.account(account_id).is_none() {
            return false;
        }
        self.selected_account = Some(account_id.to_string());
        true
    }

    /// Narrow steps to one task and switch to the task steps tab.
    pub fn select_task(&mut self, task_id: &str) -> bool {
        if self.task(task_id).is_none() {
            return false;
        }
        self.selected_task = Some(task_id.to_string());
        self.active_tab = Tab::TaskSteps;
        true
    }

    pub fn select_task_step(&mut self, step_id: &str) -> bool {
        if self.task_step(step_id).is_none() {
            return false;
        }
        self.selected_step = Some(step_id.to_string());
        true
    }

    pub fn clear_selection(&mut self, collection: Collection) {
        match collection {
            Collection::Entities => self.selected_entity = None,
            Collection::Accounts => self.selected_account = None,
            Collection::Tasks => self.selected_task = None,
            Collection::TaskSteps => self.selected_step = None,
        }
    }

    pub(crate) fn selected_id(&self, collection: Collection) -> Option<&str> {
        match collection {
            Collection::Entities => self.selected_entity.as_deref(),
            Collection::Accounts => self.selected_account.as_deref(),
            Collection::Tasks => self.selected_task.as_deref(),
            Collection::TaskSteps => self.selected_step.as_deref(),
        }
    }

    // === Tabs ===

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    // === Modal ===

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn open_modal(&mut self, draft: FormDraft, editing_id: Option<String>) {
        self.modal = Some(Modal { editing_id, draft });
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Id being edited in the open modal of the given kind.
    pub fn editing_id(&self, kind: ModalKind) -> Option<&str> {
        self.modal
            .as_ref()
            .filter(|m| m.kind() == kind)
            .and_then(|m| m.editing_id.as_deref())
    }

    // === Notices ===

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn push_notice(&mut self, kind: NoticeKind, message: impl Into<String>) -> Uuid {
        self.push_notice_at(kind, message, Instant::now())
    }

    pub fn push_notice_at(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        now: Instant,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.notices.push(Notice {
            id,
            kind,
            message: message.into(),
            created_at: now,
        });
        id
    }

    pub fn dismiss_notice(&mut self, id: Uuid) {
        self.notices.retain(|n| n.id != id);
    }

    pub fn expire_notices(&mut self, now: Instant) {
        self.notices
            .retain(|n| now.saturating_duration_since(n.created_at) < NOTICE_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityStatus, Priority, TaskStatus};

    fn entity(id: &str, name: &str) -> Entity {
        Entity {
            id: id.to_string(),
            entity_name: name.to_string(),
            ein: None,
            date_of_formation: None,
            registered_address: None,
            state_of_formation: None,
            entity_type: None,
            status: EntityStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    fn account(id: &str, entity_id: Option<&str>) -> Account {
        Account {
            id: id.to_string(),
            entity_id: entity_id.map(str::to_string),
            account_name: format!("account {}", id),
            login_url: None,
            username: None,
            account_type: None,
            notes: None,
        }
    }

    fn task(id: &str, entity_id: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            entity_id: entity_id.map(str::to_string),
            account_id: None,
            task_title: format!("task {}", id),
            description: None,
            deadline: None,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            steps: Vec::new(),
        }
    }

    fn step(id: &str, task_id: &str, order: Option<u32>) -> TaskStep {
        TaskStep {
            id: id.to_string(),
            task_id: task_id.to_string(),
            step_name: format!("step {}", id),
            description: None,
            step_order: order,
            completed: false,
            status: TaskStatus::Pending,
        }
    }

    fn populated() -> AppState {
        let mut state = AppState::new();
        state.replace_entities(vec![entity("e1", "Acme"), entity("e2", "Globex")]);
        state.replace_accounts(vec![
            account("a1", Some("e1")),
            account("a2", Some("e2")),
            account("a3", None),
        ]);
        state.replace_tasks(vec![
            task("t1", Some("e1")),
            task("t2", Some("e1")),
            task("t3", None),
        ]);
        state.replace_task_steps(vec![
            step("s1", "t1", Some(2)),
            step("s2", "t2", Some(1)),
            step("s3", "t1", Some(1)),
        ]);
        state
    }

    #[test]
    fn test_select_entity_filters_without_mutation() {
        let mut state = populated();
        assert!(state.select_entity("e1"));

        let accounts: Vec<&str> = state.visible_accounts().into_iter().map(|a| a.id.as_str()).collect();
        let tasks: Vec<&str> = state.visible_tasks().into_iter().map(|t| t.id.as_str()).collect();
        assert_eq!(accounts, vec!["a1"]);
        assert_eq!(tasks, vec!["t1", "t2"]);

        assert_eq!(state.accounts().len(), 3);
        assert_eq!(state.tasks().len(), 3);
        assert_eq!(state.active_tab(), Tab::Accounts);
    }

    #[test]
    fn test_select_unknown_entity_is_noop() {
        let mut state = populated();
        assert!(!state.select_entity("missing"));
        assert!(state.selected_entity().is_none());
        assert_eq!(state.visible_accounts().len(), 3);
        assert_eq!(state.active_tab(), Tab::Entities);
    }

    #[test]
    fn test_select_task_filters_and_orders_steps() {
        let mut state = populated();
        assert!(state.select_task("t1"));

        let steps: Vec<&str> = state.visible_steps().into_iter().map(|s| s.id.as_str()).collect();
        assert_eq!(steps, vec!["s3", "s1"]);
        assert_eq!(state.active_tab(), Tab::TaskSteps);
        assert_eq!(state.task_steps().len(), 3);
    }

    #[test]
    fn test_foreign_key_labels() {
        let state = populated();
        assert_eq!(state.entity_name_for(Some("e2")), "Globex");
        assert_eq!(state.entity_name_for(Some("gone")), "Unknown");
        assert_eq!(state.entity_name_for(None), "Unknown");
        assert_eq!(state.account_name_for(Some("a1")), "account a1");
        assert_eq!(state.account_name_for(None), "-");
        assert_eq!(state.task_title_for("t2"), "task t2");
        assert_eq!(state.task_title_for("nope"), "Unknown");
    }

    #[test]
    fn test_accounts_for_entity_cascade() {
        let state = populated();
        let ids: Vec<&str> = state.accounts_for_entity("e2").map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a2"]);
        assert_eq!(state.accounts_for_entity("e9").count(), 0);
    }

    #[test]
    fn test_reload_drops_stale_selection() {
        let mut state = populated();
        state.select_entity("e2");
        state.replace_entities(vec![entity("e1", "Acme")]);
        assert!(state.selected_entity().is_none());
    }

    #[test]
    fn test_editing_id_is_scoped_to_modal_kind() {
        let mut state = populated();
        state.open_modal(
            FormDraft::Entity(EntityInput::from(&entity("e1", "Acme"))),
            Some("e1".to_string()),
        );
        assert_eq!(state.editing_id(ModalKind::Entity), Some("e1"));
        assert_eq!(state.editing_id(ModalKind::Task), None);
        assert_eq!(state.modal().unwrap().title(), "Edit Entity");

        state.close_modal();
        assert_eq!(state.editing_id(ModalKind::Entity), None);
    }

    #[test]
    fn test_notices_expire() {
        let mut state = AppState::new();
        let start = Instant::now();
        state.push_notice_at(NoticeKind::Success, "saved", start);
        let keep = state.push_notice_at(NoticeKind::Info, "later", start + Duration::from_secs(3));

        state.expire_notices(start + Duration::from_secs(6));
        assert_eq!(state.notices().len(), 1);
        assert_eq!(state.notices()[0].id, keep);

        state.dismiss_notice(keep);
        assert!(state.notices().is_empty());
    }
}

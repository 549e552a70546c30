//! HTML views over [`AppState`]. Pure functions: nothing here mutates state.

use std::fmt::Write as _;
use std::path::Path;

use super::state::{AppState, FormDraft, Modal, Tab};
use crate::error::Result;
use crate::models::{EntityStatus, TaskStatus};

/// Display class for a status badge. Unknown values are neutral.
pub fn status_badge_class(status: &str) -> &'static str {
    match status {
        "active" => EntityStatus::Active.badge_class(),
        "inactive" => EntityStatus::Inactive.badge_class(),
        other => TaskStatus::from(other.to_string()).badge_class(),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn opt(value: Option<&str>) -> String {
    escape(value.unwrap_or("-"))
}

fn badge(status: &str) -> String {
    format!(
        r#"<span class="badge bg-{}">{}</span>"#,
        status_badge_class(status),
        escape(status)
    )
}

fn empty_row(columns: usize, message: &str) -> String {
    format!(
        r#"<tr><td colspan="{}" class="text-center text-muted">{}</td></tr>"#,
        columns,
        escape(message)
    )
}

fn table(id: &str, headers: &[&str], rows: Vec<String>, empty: &str) -> String {
    let mut html = format!(r#"<table class="table table-hover" id="{}"><thead><tr>"#, id);
    for h in headers {
        let _ = write!(html, "<th>{}</th>", escape(h));
    }
    html.push_str("</tr></thead><tbody>");
    if rows.is_empty() {
        html.push_str(&empty_row(headers.len(), empty));
    } else {
        for row in rows {
            html.push_str(&row);
        }
    }
    html.push_str("</tbody></table>");
    html
}

fn selected_attr(selected: bool) -> &'static str {
    if selected {
        r#" class="table-active""#
    } else {
        ""
    }
}

pub fn entities_table(state: &AppState) -> String {
    let selected = state.selected_entity().map(|e| e.id.as_str());
    let rows = state
        .entities()
        .iter()
        .map(|e| {
            format!(
                r#"<tr data-id="{}"{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(&e.id),
                selected_attr(selected == Some(e.id.as_str())),
                escape(&e.entity_name),
                opt(e.entity_type.as_deref()),
                opt(e.state_of_formation.as_deref()),
                opt(e.ein.as_deref()),
                badge(e.status.as_str()),
            )
        })
        .collect();

    table(
        "entities",
        &["Name", "Type", "State", "EIN", "Status"],
        rows,
        "No entities found",
    )
}

pub fn accounts_table(state: &AppState) -> String {
    let rows = state
        .visible_accounts()
        .into_iter()
        .map(|a| {
            let link = match a.entity_id.as_deref() {
                Some(id) => format!(
                    r#"<span class="badge bg-primary">Linked</span> {}"#,
                    escape(state.entity_name_for(Some(id)))
                ),
                None => r#"<span class="badge bg-secondary">Standalone</span>"#.to_string(),
            };
            format!(
                r#"<tr data-id="{}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(&a.id),
                escape(&a.account_name),
                opt(a.account_type.as_deref()),
                opt(a.username.as_deref()),
                opt(a.login_url.as_deref()),
                link,
            )
        })
        .collect();

    table(
        "accounts",
        &["Account", "Type", "Username", "Login URL", "Entity"],
        rows,
        "No accounts found",
    )
}

pub fn tasks_table(state: &AppState) -> String {
    let selected = state.selected_task().map(|t| t.id.as_str());
    let rows = state
        .visible_tasks()
        .into_iter()
        .map(|t| {
            let entity = match t.entity_id.as_deref() {
                Some(id) => escape(state.entity_name_for(Some(id))),
                None => r#"<span class="badge bg-secondary">Standalone</span>"#.to_string(),
            };
            format!(
                r#"<tr data-id="{}"{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(&t.id),
                selected_attr(selected == Some(t.id.as_str())),
                escape(&t.task_title),
                entity,
                escape(state.account_name_for(t.account_id.as_deref())),
                opt(t.deadline.as_deref()),
                escape(t.priority.as_str()),
                badge(t.status.as_str()),
                t.steps.len(),
            )
        })
        .collect();

    table(
        "tasks",
        &["Task", "Entity", "Account", "Deadline", "Priority", "Status", "Steps"],
        rows,
        "No tasks found",
    )
}

pub fn task_steps_table(state: &AppState) -> String {
    let rows = state
        .visible_steps()
        .into_iter()
        .map(|s| {
            format!(
                r#"<tr data-id="{}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(&s.id),
                s.step_order.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string()),
                escape(&s.step_name),
                escape(state.task_title_for(&s.task_id)),
                if s.completed { "Yes" } else { "No" },
                badge(s.status.as_str()),
            )
        })
        .collect();

    table(
        "task-steps",
        &["#", "Step", "Task", "Done", "Status"],
        rows,
        "No task steps found",
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

pub fn entity_options(state: &AppState, selected: Option<&str>) -> String {
    let mut html = option("", "Select Entity", selected.is_none());
    for e in state.entities() {
        html.push_str(&option(&e.id, &e.entity_name, selected == Some(e.id.as_str())));
    }
    html
}

pub fn account_options(state: &AppState, entity_id: Option<&str>, selected: Option<&str>) -> String {
    let mut html = option("", "Select Account", selected.is_none());
    if let Some(entity_id) = entity_id {
        for a in state.accounts_for_entity(entity_id) {
            html.push_str(&option(&a.id, &a.account_name, selected == Some(a.id.as_str())));
        }
    }
    html
}

pub fn notices(state: &AppState) -> String {
    let mut html = String::from(r#"<div class="notices">"#);
    for n in state.notices() {
        let _ = write!(
            html,
            r#"<div class="alert alert-{}" data-id="{}">{}</div>"#,
            n.kind.as_str(),
            n.id,
            escape(&n.message)
        );
    }
    html.push_str("</div>");
    html
}

fn field(name: &str, label: &str, value: Option<&str>) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" value="{value}">"#,
        name = name,
        label = escape(label),
        value = escape(value.unwrap_or("")),
    )
}

pub fn modal(state: &AppState, modal: &Modal) -> String {
    let mut body = String::new();
    match &modal.draft {
        FormDraft::Entity(e) => {
            body.push_str(&field("entity_name", "Entity Name", Some(&e.entity_name)));
            body.push_str(&field("ein", "EIN", e.ein.as_deref()));
            body.push_str(&field("entity_type", "Entity Type", e.entity_type.as_deref()));
            body.push_str(&field(
                "state_of_formation",
                "State of Formation",
                e.state_of_formation.as_deref(),
            ));
            body.push_str(&field("status", "Status", Some(e.status.as_str())));
        }
        FormDraft::Account(a) => {
            let _ = write!(
                body,
                r#"<select name="entity_id">{}</select>"#,
                entity_options(state, a.entity_id.as_deref())
            );
            body.push_str(&field("account_name", "Account Name", Some(&a.account_name)));
            body.push_str(&field("username", "Username", a.username.as_deref()));
            body.push_str(r#"<label for="password">Password</label><input id="password" name="password" type="password" value="">"#);
            body.push_str(&field("login_url", "Login URL", a.login_url.as_deref()));
        }
        FormDraft::Task(t) => {
            let _ = write!(
                body,
                r#"<select name="entity_id">{}</select><select name="account_id">{}</select>"#,
                entity_options(state, t.entity_id.as_deref()),
                account_options(state, t.entity_id.as_deref(), t.account_id.as_deref())
            );
            body.push_str(&field("task_title", "Task Title", Some(&t.task_title)));
            body.push_str(&field("deadline", "Deadline", t.deadline.as_deref()));
            body.push_str(&field("priority", "Priority", Some(t.priority.as_str())));
            body.push_str(&field("status", "Status", Some(t.status.as_str())));
            for s in &t.steps {
                body.push_str(&field(
                    &format!("step_{}", s.step_order),
                    &format!("Step {}", s.step_order),
                    Some(&s.step_description),
                ));
            }
        }
        FormDraft::TaskStep(s) => {
            body.push_str(&field("task_id", "Task", Some(&s.task_id)));
            body.push_str(&field("step_name", "Step", Some(&s.step_name)));
            body.push_str(&field("description", "Description", s.description.as_deref()));
            body.push_str(&field("status", "Status", Some(s.status.as_str())));
        }
    }

    format!(
        r#"<div class="modal show" id="{}-modal"><h5 class="modal-title">{}</h5><form>{}</form></div>"#,
        modal.kind().collection().label().replace(' ', "-"),
        escape(&modal.title()),
        body
    )
}

fn tab_class(state: &AppState, tab: Tab) -> &'static str {
    if state.active_tab() == tab {
        "tab-pane active"
    } else {
        "tab-pane"
    }
}

pub fn page(state: &AppState) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Entity Tracker</title></head><body>",
    );
    html.push_str(&notices(state));

    if let Some(entity) = state.selected_entity() {
        let _ = write!(
            html,
            r#"<p class="selection">Entity: {}</p>"#,
            escape(&entity.entity_name)
        );
    }
    if let Some(task) = state.selected_task() {
        let _ = write!(
            html,
            r#"<p class="selection">Task: {}</p>"#,
            escape(&task.task_title)
        );
    }

    let panes = [
        (Tab::Entities, entities_table(state)),
        (Tab::Accounts, accounts_table(state)),
        (Tab::Tasks, tasks_table(state)),
        (Tab::TaskSteps, task_steps_table(state)),
    ];
    for (tab, content) in panes {
        let _ = write!(html, r#"<div class="{}">{}</div>"#, tab_class(state, tab), content);
    }

    if let Some(m) = state.modal() {
        html.push_str(&modal(state, m));
    }

    html.push_str("</body></html>\n");
    html
}

pub fn write_page(state: &AppState, path: &Path) -> Result<()> {
    std::fs::write(path, page(state))?;
    tracing::info!("dashboard written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Entity, EntityInput, Priority, Task};
    use crate::tracker::state::NoticeKind;

    fn entity(id: &str, name: &str) -> Entity {
        Entity {
            id: id.to_string(),
            entity_name: name.to_string(),
            ein: None,
            date_of_formation: None,
            registered_address: None,
            state_of_formation: Some("DE".to_string()),
            entity_type: Some("LLC".to_string()),
            status: EntityStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    fn account(id: &str, entity_id: Option<&str>) -> Account {
        Account {
            id: id.to_string(),
            entity_id: entity_id.map(str::to_string),
            account_name: format!("Account {}", id),
            login_url: None,
            username: None,
            account_type: None,
            notes: None,
        }
    }

    #[test]
    fn test_status_badge_class() {
        assert_eq!(status_badge_class("active"), "success");
        assert_eq!(status_badge_class("pending"), "warning");
        assert_eq!(status_badge_class("in_progress"), "info");
        assert_eq!(status_badge_class("completed"), "success");
        assert_eq!(status_badge_class("cancelled"), "danger");
        assert_eq!(status_badge_class("inactive"), "secondary");
        assert_eq!(status_badge_class("archived"), "secondary");
    }

    #[test]
    fn test_values_are_escaped() {
        let mut state = AppState::new();
        state.replace_entities(vec![entity("e1", "<script>alert('x')</script> & Co")]);

        let html = entities_table(&state);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; Co"));
    }

    #[test]
    fn test_empty_collections_render_placeholder() {
        let state = AppState::new();
        assert!(entities_table(&state).contains("No entities found"));
        assert!(accounts_table(&state).contains("No accounts found"));
        assert!(tasks_table(&state).contains("No tasks found"));
        assert!(task_steps_table(&state).contains("No task steps found"));
    }

    #[test]
    fn test_linked_and_standalone_accounts() {
        let mut state = AppState::new();
        state.replace_entities(vec![entity("e1", "Acme")]);
        state.replace_accounts(vec![account("a1", Some("e1")), account("a2", None)]);

        let html = accounts_table(&state);
        assert!(html.contains("Linked</span> Acme"));
        assert!(html.contains("Standalone"));
    }

    #[test]
    fn test_tasks_show_unknown_entity_and_missing_account() {
        let mut state = AppState::new();
        state.replace_tasks(vec![Task {
            id: "t1".to_string(),
            entity_id: Some("gone".to_string()),
            account_id: None,
            task_title: "Renew license".to_string(),
            description: None,
            deadline: None,
            priority: Priority::High,
            status: TaskStatus::InProgress,
            steps: Vec::new(),
        }]);

        let html = tasks_table(&state);
        assert!(html.contains("<td>Unknown</td><td>-</td>"));
        assert!(html.contains(r#"badge bg-info">in_progress"#));
    }

    #[test]
    fn test_account_options_follow_entity() {
        let mut state = AppState::new();
        state.replace_accounts(vec![account("a1", Some("e1")), account("a2", Some("e2"))]);

        let html = account_options(&state, Some("e1"), Some("a1"));
        assert!(html.contains(r#"value="a1" selected"#));
        assert!(!html.contains("a2"));
        assert_eq!(account_options(&state, None, None).matches("<option").count(), 1);
    }

    #[test]
    fn test_page_includes_notices_and_modal() {
        let mut state = AppState::new();
        state.replace_entities(vec![entity("e1", "Acme")]);
        state.push_notice(NoticeKind::Danger, "Error: HTTP error! status: 500");
        state.open_modal(FormDraft::Entity(EntityInput::default()), None);

        let html = page(&state);
        assert!(html.contains(r#"alert alert-danger"#));
        assert!(html.contains("Add New Entity"));
        assert!(html.contains(r#"<div class="tab-pane active"><table class="table table-hover" id="entities">"#));
    }

    #[test]
    fn test_write_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.html");
        let mut state = AppState::new();
        state.replace_entities(vec![entity("e1", "Acme")]);

        write_page(&state, &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Acme"));
    }
}

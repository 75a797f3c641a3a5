//! Plain-text rendering of the task list for the terminal.

use crate::models::Task;
use crate::services::{Notice, TaskListController, ViewState};
use crate::utils::time::format_timestamp;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::{Display, Write};

pub const EMPTY_STATE_MESSAGE: &str = "No tasks found. Let's add some!";
pub const ADD_FIRST_TASK_HINT: &str = "Add your first task: taskdeck add \"<title>\"";
pub const RETRY_HINT: &str = "Try again: taskdeck list";

const PROGRESS_BAR_WIDTH: usize = 20;

/// One task line plus its date line
pub fn render_task_row<Tz>(index: usize, task: &Task, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut row = format!("{index:>3}. {check} {}  ({})", task.title, task.id);

    let mut details = vec![format!("Created: {}", format_timestamp(&task.created_at, tz))];
    if let Some(due) = &task.due_date {
        let mut due_text = format!("Due: {}", format_timestamp(due, tz));
        if task.is_overdue(now) {
            due_text.push_str(" (overdue)");
        }
        details.push(due_text);
    }

    let _ = write!(row, "\n       {}", details.join("   "));
    row
}

/// `2 of 5 tasks completed` with a bar, or `None` for an empty list
pub fn render_progress(completed: usize, total: usize) -> Option<String> {
    if total == 0 {
        return None;
    }

    let filled = completed * PROGRESS_BAR_WIDTH / total;
    let percent = completed * 100 / total;
    Some(format!(
        "{completed} of {total} tasks completed\n[{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
    ))
}

/// Render the list view for whatever state the controller is in
pub fn render_list<Tz>(
    controller: &TaskListController,
    username: Option<&str>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match controller.view_state() {
        ViewState::Loading => "Loading tasks...".to_string(),
        ViewState::Error(message) => format!("{message}\n{RETRY_HINT}"),
        ViewState::Loaded => {
            let mut out = String::new();
            if let Some(username) = username {
                let _ = writeln!(out, "{username}'s Tasks\n");
            }

            if controller.is_empty() {
                let _ = write!(out, "{EMPTY_STATE_MESSAGE}\n{ADD_FIRST_TASK_HINT}");
                return out;
            }

            let rows: Vec<String> = controller
                .tasks()
                .iter()
                .enumerate()
                .map(|(i, task)| render_task_row(i + 1, task, now, tz))
                .collect();
            out.push_str(&rows.join("\n"));

            if let Some(progress) = render_progress(controller.completed_count(), controller.len()) {
                let _ = write!(out, "\n\n{progress}");
            }
            out
        }
    }
}

/// Render queued notices, one per line
pub fn render_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| format!("! {}", n.message))
        .collect::<Vec<_>>()
        .join("\n")
}

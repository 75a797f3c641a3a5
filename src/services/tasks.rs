//! Task list controller: the local mirror of the user's tasks.
//!
//! Update strategy:
//! - `load_tasks` replaces the whole mirror with the backend's list.
//! - `create_task` appends the task the backend returns.
//! - `delete_task` and `toggle_complete` apply optimistically and roll back
//!   if the backend rejects the change. The failure is queued as a
//!   [`Notice`] as well as returned.

use crate::models::{CreateTaskRequest, Task, TaskForm, UpdateTaskRequest, ValidationError};
use crate::services::api_client::{ApiClient, ApiError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, error, info, warn};

pub const TASKS_PATH: &str = "/api/todos";

pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch todos";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to add task. Please try again.";

/// `/api/todos/<id>`, with the id kept as a single path segment
fn task_path(id: &str) -> [&str; 3] {
    ["api", "todos", id]
}

/// State of the list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Loaded,
    /// Loading failed; the view should offer a retry
    Error(String),
}

/// State of the new-task form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

/// A non-blocking notification about a background failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub task_id: Option<String>,
}

/// Mount flag shared between a controller and the view that owns it.
///
/// The view keeps a clone and calls [`ViewGuard::unmount`] when it goes
/// away; responses that land afterwards are dropped instead of applied.
#[derive(Debug, Clone)]
pub struct ViewGuard {
    mounted: Arc<AtomicBool>,
}

impl Default for ViewGuard {
    fn default() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ViewGuard {
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}

/// Controller for the task list and the new-task form
pub struct TaskListController {
    api: ApiClient,
    tasks: Vec<Task>,
    view_state: ViewState,
    form_state: FormState,
    form_error: Option<String>,
    notices: Vec<Notice>,
    guard: ViewGuard,
}

impl TaskListController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            view_state: ViewState::Loading,
            form_state: FormState::Idle,
            form_error: None,
            notices: Vec::new(),
            guard: ViewGuard::default(),
        }
    }

    /// Handle the view uses to signal unmount
    pub fn guard(&self) -> ViewGuard {
        self.guard.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn form_state(&self) -> FormState {
        self.form_state
    }

    /// Inline error for the new-task form
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn clear_form_error(&mut self) {
        self.form_error = None;
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Fraction of completed tasks, 0.0 for an empty list
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            0.0
        } else {
            self.completed_count() as f64 / self.tasks.len() as f64
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain queued notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the full collection and replace the mirror.
    ///
    /// On failure the previous mirror is kept and the view moves to
    /// [`ViewState::Error`].
    pub async fn load_tasks(&mut self) -> Result<&[Task], ApiError> {
        if !self.api.has_auth() {
            self.view_state = ViewState::Error(LOAD_FAILED_MESSAGE.to_string());
            return Err(ApiError::NotAuthenticated);
        }

        self.view_state = ViewState::Loading;
        let result = self.api.get::<Vec<Task>>(TASKS_PATH).await;

        if !self.guard.is_mounted() {
            debug!("List view unmounted, discarding fetched tasks");
            return Err(ApiError::ViewUnmounted);
        }

        match result {
            Ok(tasks) => {
                self.tasks = dedupe(tasks);
                self.view_state = ViewState::Loaded;
                info!(count = self.tasks.len(), "Loaded tasks");
                Ok(&self.tasks)
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch tasks");
                self.view_state = ViewState::Error(LOAD_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Validate the form and create the task it describes
    pub async fn submit(&mut self, form: &TaskForm) -> Result<Task, ApiError> {
        let request = form.validate().inspect_err(|e| {
            self.form_error = Some(e.message().to_string());
        })?;
        self.create(request).await
    }

    /// Create a task. A blank title fails locally and sends nothing.
    pub async fn create_task(
        &mut self,
        title: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task, ApiError> {
        let title = title.trim();
        if title.is_empty() {
            let err = ValidationError::new("Task title cannot be empty");
            self.form_error = Some(err.message().to_string());
            return Err(err.into());
        }

        self.create(CreateTaskRequest {
            title: title.to_string(),
            due_date,
        })
        .await
    }

    async fn create(&mut self, request: CreateTaskRequest) -> Result<Task, ApiError> {
        self.form_error = None;
        self.form_state = FormState::Submitting;
        let result = self.api.post::<_, Task>(TASKS_PATH, &request).await;
        self.form_state = FormState::Idle;

        match result {
            Ok(task) => {
                if self.guard.is_mounted() {
                    info!(task_id = %task.id, "Created task");
                    self.upsert(task.clone());
                }
                Ok(task)
            }
            Err(e) => {
                error!(error = %e, "Failed to add task");
                self.form_error = Some(CREATE_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Delete a task, removing it from the mirror first and restoring it if
    /// the backend refuses.
    pub async fn delete_task(&mut self, id: &str) -> Result<(), ApiError> {
        let position = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        let removed = self.tasks.remove(position);

        let result = self.api.delete(&task_path(id)).await;

        if !self.guard.is_mounted() {
            debug!(task_id = %id, "List view unmounted, skipping reconciliation");
            return result;
        }

        match result {
            Ok(()) => {
                info!(task_id = %id, "Deleted task");
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "Error deleting task, restoring it");
                let position = position.min(self.tasks.len());
                self.tasks.insert(position, removed);
                self.notify(format!("Could not delete task: {}", e.user_message()), id);
                Err(e)
            }
        }
    }

    /// Flip a task's completion, optimistically.
    ///
    /// `current_completed` is the state the user saw; the request asks for
    /// its negation.
    pub async fn toggle_complete(&mut self, id: &str, current_completed: bool) -> Result<(), ApiError> {
        let target = !current_completed;
        let previous = {
            let task = self
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
            let previous = task.completed;
            task.completed = target;
            previous
        };

        let body = UpdateTaskRequest { completed: target };
        let result = self.api.patch_raw(&task_path(id), &body).await;

        if !self.guard.is_mounted() {
            debug!(task_id = %id, "List view unmounted, skipping reconciliation");
            return result.map(|_| ());
        }

        match result {
            Ok(raw) => {
                // Take the server's copy when it is a full task record
                match serde_json::from_slice::<Task>(&raw) {
                    Ok(updated) if updated.id == id => self.upsert(updated),
                    _ => debug!(task_id = %id, "Update response was not a task, keeping local state"),
                }
                info!(task_id = %id, completed = target, "Updated task");
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "Error updating task, rolling back");
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.completed = previous;
                }
                self.notify(format!("Could not update task: {}", e.user_message()), id);
                Err(e)
            }
        }
    }

    fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    fn notify(&mut self, message: String, task_id: &str) {
        self.notices.push(Notice {
            message,
            task_id: Some(task_id.to_string()),
        });
    }
}

/// Keep the first task for each id
fn dedupe(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let total = tasks.len();
    let unique: Vec<Task> = tasks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();

    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "Backend returned duplicate task ids, keeping first occurrence"
        );
    }
    unique
}

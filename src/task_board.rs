use crate::api::ApiError;
use crate::app::{Effect, Notice};
use crate::task::{NewTask, Task};
use chrono::{DateTime, Local};
use tracing::{info, warn};

pub const EMPTY_STATE: &str = "No active strategies found.";
pub const DELETE_PROMPT: &str = "Delete this strategy note?";

/// Task dashboard state. `tasks` is always the last full snapshot from the backend.
#[derive(Debug, Default)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
    pub draft_title: String,
    pub selected: usize,
    pending_delete: Option<i64>,
    notice: Option<Notice>,
    last_synced: Option<DateTime<Local>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Effect {
        Effect::LoadTasks
    }

    /// Replaces the snapshot. A failed load keeps the previous list and is only logged.
    pub fn on_loaded(&mut self, result: Result<Vec<Task>, ApiError>) {
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
                self.last_synced = Some(Local::now());
            }
            Err(err) => warn!(error = %err, "failed to load tasks, keeping last list"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn last_synced(&self) -> Option<DateTime<Local>> {
        self.last_synced
    }

    pub fn input(&mut self, c: char) {
        self.draft_title.push(c);
    }

    pub fn backspace(&mut self) {
        self.draft_title.pop();
    }

    /// Creates a task from the draft. Blank drafts do nothing.
    pub fn submit_draft(&mut self) -> Option<Effect> {
        if self.draft_title.trim().is_empty() {
            return None;
        }
        self.notice = None;
        Some(Effect::CreateTask(NewTask::from_title(self.draft_title.clone())))
    }

    pub fn on_created(&mut self, result: Result<Task, ApiError>) -> Vec<Effect> {
        match result {
            Ok(task) => {
                info!(id = task.id, "created task");
                self.draft_title.clear();
                vec![self.load()]
            }
            Err(err) => {
                warn!(error = %err, "failed to create task");
                self.notice = Some(Notice::error(format!(
                    "Failed to add entry: {}",
                    err.user_message()
                )));
                vec![]
            }
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    /// Asks for confirmation before deleting the selected task.
    pub fn request_delete(&mut self) -> bool {
        match self.selected_task().map(|task| task.id) {
            Some(id) => {
                self.pending_delete = Some(id);
                true
            }
            None => false,
        }
    }

    /// Id of the task waiting for a yes/no answer.
    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn confirm_delete(&mut self) -> Option<Effect> {
        let id = self.pending_delete.take()?;
        self.notice = None;
        Some(Effect::DeleteTask(id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn on_deleted(&mut self, id: i64, result: Result<(), ApiError>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                info!(id, "deleted task");
                vec![self.load()]
            }
            Err(err) => {
                warn!(id, error = %err, "failed to delete task");
                self.notice = Some(Notice::error(format!(
                    "Failed to delete: {}",
                    err.user_message()
                )));
                vec![]
            }
        }
    }
}

//! The command surface the UIs drive.
//!
//! A [`Session`] pairs the task store with the current filter and search
//! term. Commands never fail: every outcome, including validation and
//! lookup errors, comes back as a [`Feedback`] carrying the status line to
//! show. After any command the caller re-reads [`Session::view`].

use chrono::{DateTime, Utc};
use log::debug;

use crate::model::task::TaskDraft;
use crate::ops::task_store::{TaskError, TaskStore};
use crate::ops::view::{self, Filter, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A transient, human-readable status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    fn from_error(err: &TaskError) -> Self {
        match err {
            TaskError::Validation => StatusMessage::error("Task title is required"),
            TaskError::NotFound(_) => StatusMessage::error("Task not found"),
            TaskError::AmbiguousId(_) => StatusMessage::error("Task id is ambiguous"),
        }
    }
}

/// Offer to restore a just-deleted task, valid until `expires_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOffer {
    pub title: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: StatusMessage,
    pub undo_offer: Option<UndoOffer>,
}

impl Feedback {
    fn message(message: StatusMessage) -> Self {
        Feedback {
            message,
            undo_offer: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.kind == StatusKind::Error
    }
}

pub struct Session {
    store: TaskStore,
    filter: Filter,
    search: String,
}

impl Session {
    pub fn new(store: TaskStore) -> Self {
        Session {
            store,
            filter: Filter::All,
            search: String::new(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// The visible task list for the current filter and search term
    pub fn view(&self) -> Projection<'_> {
        view::project(self.store.tasks(), self.filter, &self.search)
    }

    pub fn set_filter(&mut self, filter: Filter) {
        debug!("event=set_filter filter={}", filter);
        self.filter = filter;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn add(&mut self, draft: TaskDraft) -> Feedback {
        match self.store.add(draft) {
            Ok(_) => Feedback::message(StatusMessage::info("Task added successfully")),
            Err(e) => Feedback::message(StatusMessage::from_error(&e)),
        }
    }

    pub fn update(&mut self, id: &str, draft: TaskDraft) -> Feedback {
        match self.store.update(id, draft) {
            Ok(_) => Feedback::message(StatusMessage::info("Task updated successfully")),
            Err(e) => Feedback::message(StatusMessage::from_error(&e)),
        }
    }

    pub fn toggle(&mut self, id: &str) -> Feedback {
        match self.store.toggle(id) {
            Ok(completed) => Feedback::message(StatusMessage::info(format!(
                "Task marked as {}",
                if completed { "completed" } else { "pending" }
            ))),
            Err(e) => Feedback::message(StatusMessage::from_error(&e)),
        }
    }

    pub fn delete(&mut self, id: &str) -> Feedback {
        match self.store.delete(id) {
            Ok(task) => Feedback {
                message: StatusMessage::info("Task deleted"),
                undo_offer: self.store.pending_undo().map(|p| UndoOffer {
                    title: task.title,
                    expires_at: p.expires_at,
                }),
            },
            Err(e) => Feedback::message(StatusMessage::from_error(&e)),
        }
    }

    pub fn undo(&mut self) -> Feedback {
        match self.store.undo_last_delete() {
            Some(_) => Feedback::message(StatusMessage::info("Task restored")),
            None => Feedback::message(StatusMessage::info("Nothing to undo")),
        }
    }

    /// Pick up task changes another process wrote.
    /// Returns true when the list changed.
    pub fn reload(&mut self) -> bool {
        self.store.reload()
    }

    /// Drive the undo expiry. Returns true when a pending offer just lapsed.
    pub fn tick(&mut self) -> bool {
        self.store.expire_undo().is_some()
    }
}

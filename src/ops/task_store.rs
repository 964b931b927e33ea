use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};

use crate::io::lock::FileLock;
use crate::io::store::{CORRUPT_TASKS_KEY, KeyValueStore, StoreError, TASKS_KEY};
use crate::model::task::{Task, TaskDraft};
use crate::ops::clock::Clock;
use crate::ops::codec::{self, Repair};

/// How long a deleted task stays restorable
pub const UNDO_WINDOW_SECS: i64 = 5;

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task title is required")]
    Validation,
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("id prefix '{0}' matches more than one task")]
    AmbiguousId(String),
}

/// A deleted task waiting in the undo slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUndo {
    pub task: Task,
    pub expires_at: DateTime<Utc>,
}

/// The authoritative task collection.
///
/// Order is newest-first: adds and undos prepend, updates keep position.
/// Every mutation runs under the store's lock: it first adopts whatever
/// another writer persisted since this store last read or wrote, then
/// applies the change and writes it through before returning.
pub struct TaskStore {
    tasks: Vec<Task>,
    pending_undo: Option<PendingUndo>,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    persist_error: Option<StoreError>,
    /// Persisted text as of the last read or write
    last_raw: Option<String>,
    /// Set when the persisted data could neither be read nor preserved
    overwrite_blocked: bool,
}

impl TaskStore {
    /// Build the store from persisted data.
    ///
    /// Absent data is an empty collection. Data that cannot be read or
    /// decoded is copied verbatim to [`CORRUPT_TASKS_KEY`] and treated as
    /// empty; if that copy fails the store never writes over the original.
    /// Records needing repair (missing ids and the like) are fixed and the
    /// corrected collection is written back once.
    pub fn load_all(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let mut this = TaskStore {
            tasks: Vec::new(),
            pending_undo: None,
            store,
            clock,
            persist_error: None,
            last_raw: None,
            overwrite_blocked: false,
        };
        let _guard = this.lock();
        match this.store.get(TASKS_KEY) {
            Ok(None) => info!("event=tasks_load status=ok count=0 source=empty"),
            Ok(Some(raw)) => this.adopt(raw),
            Err(e) => this.quarantine(&e.to_string()),
        }
        this
    }

    /// Adopt changes another writer persisted since this store last read or
    /// wrote. Returns true when the collection changed.
    pub fn reload(&mut self) -> bool {
        let _guard = self.lock();
        self.sync()
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The undo slot, if it holds a task that has not yet expired
    pub fn pending_undo(&self) -> Option<&PendingUndo> {
        let now = self.clock.now();
        self.pending_undo.as_ref().filter(|p| now < p.expires_at)
    }

    /// Resolve a full id or a unique, non-empty id prefix to the full id
    pub fn resolve_id(&self, prefix: &str) -> Result<String, TaskError> {
        if prefix.is_empty() {
            return Err(TaskError::NotFound(String::new()));
        }
        if let Some(task) = self.get(prefix) {
            return Ok(task.id.clone());
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(TaskError::AmbiguousId(prefix.to_string())),
            (None, _) => Err(TaskError::NotFound(prefix.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a task from the draft and put it at the top of the list
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        let title = draft.normalized_title().ok_or(TaskError::Validation)?;
        let _guard = self.lock();
        self.sync();
        let task = Task {
            id: new_task_id(),
            title,
            notes: draft.normalized_notes(),
            due_date: draft.due_date,
            priority: draft.priority,
            completed: false,
            created_at: self.clock.now(),
        };
        self.tasks.insert(0, task.clone());
        self.persist();
        info!("event=task_add status=ok id={}", task.id);
        Ok(task)
    }

    /// Replace a task's editable fields, keeping id, creation time, completion
    /// state and position
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> Result<Task, TaskError> {
        let _guard = self.lock();
        self.sync();
        let index = self.index_of(id)?;
        let title = draft.normalized_title().ok_or(TaskError::Validation)?;
        let notes = draft.normalized_notes();

        let task = &mut self.tasks[index];
        task.title = title;
        task.notes = notes;
        task.due_date = draft.due_date;
        task.priority = draft.priority;
        let updated = task.clone();

        self.persist();
        info!("event=task_update status=ok id={}", id);
        Ok(updated)
    }

    /// Flip completion. Returns the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool, TaskError> {
        let _guard = self.lock();
        self.sync();
        let index = self.index_of(id)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist();
        info!("event=task_toggle status=ok id={} completed={}", id, completed);
        Ok(completed)
    }

    /// Remove a task, holding it in the undo slot for [`UNDO_WINDOW_SECS`].
    /// A previous pending undo is discarded.
    pub fn delete(&mut self, id: &str) -> Result<Task, TaskError> {
        let _guard = self.lock();
        self.sync();
        let index = self.index_of(id)?;
        let task = self.tasks.remove(index);
        if let Some(previous) = self.pending_undo.take() {
            debug!("event=undo_discard id={}", previous.task.id);
        }
        self.pending_undo = Some(PendingUndo {
            task: task.clone(),
            expires_at: self.clock.now() + Duration::seconds(UNDO_WINDOW_SECS),
        });
        self.persist();
        info!("event=task_delete status=ok id={}", id);
        Ok(task)
    }

    /// Put the most recently deleted task back at the top of the list.
    /// Does nothing once the undo window has passed.
    pub fn undo_last_delete(&mut self) -> Option<Task> {
        self.expire_undo();
        let pending = self.pending_undo.take()?;
        let task = pending.task;
        let _guard = self.lock();
        self.sync();
        if self.get(&task.id).is_none() {
            self.tasks.insert(0, task.clone());
            self.persist();
        }
        info!("event=task_restore status=ok id={}", task.id);
        Some(task)
    }

    /// Fire the undo expiry if its deadline has passed.
    /// Returns the task that became unrecoverable.
    pub fn expire_undo(&mut self) -> Option<Task> {
        let now = self.clock.now();
        match &self.pending_undo {
            Some(p) if now >= p.expires_at => {
                let expired = self.pending_undo.take().map(|p| p.task);
                if let Some(task) = &expired {
                    debug!("event=undo_expire id={}", task.id);
                }
                expired
            }
            _ => None,
        }
    }

    /// The last persistence failure, if any, clearing it
    pub fn take_persist_error(&mut self) -> Option<StoreError> {
        self.persist_error.take()
    }

    fn index_of(&self, id: &str) -> Result<usize, TaskError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// A failed lock is recorded like a failed write; the caller proceeds
    fn lock(&mut self) -> Option<FileLock> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("event=tasks_lock status=error error=\"{}\"", e);
                self.persist_error = Some(e);
                None
            }
        }
    }

    /// Re-read persisted data if it differs from what this store last saw.
    /// Caller holds the lock.
    fn sync(&mut self) -> bool {
        match self.store.get(TASKS_KEY) {
            Ok(raw) if raw == self.last_raw => false,
            Ok(None) => {
                info!("event=tasks_reload status=ok count=0 source=removed");
                self.tasks.clear();
                self.last_raw = None;
                self.overwrite_blocked = false;
                true
            }
            Ok(Some(raw)) => {
                let before = self.tasks.clone();
                self.adopt(raw);
                debug!("event=tasks_reload count={}", self.tasks.len());
                self.tasks != before
            }
            Err(e) => {
                self.quarantine(&e.to_string());
                false
            }
        }
    }

    /// Take `raw` as the current collection, repairing it if needed
    fn adopt(&mut self, raw: String) {
        match codec::decode_tasks(&raw, self.clock.now(), new_task_id) {
            Ok(decoded) => {
                self.tasks = decoded.tasks;
                self.last_raw = Some(raw);
                self.overwrite_blocked = false;
                if !decoded.repairs.is_empty() {
                    for repair in &decoded.repairs {
                        log_repair(repair);
                    }
                    self.persist();
                }
                info!(
                    "event=tasks_load status=ok count={} repairs={}",
                    self.tasks.len(),
                    decoded.repairs.len()
                );
            }
            Err(e) => {
                self.quarantine(&e.to_string());
                if !self.overwrite_blocked {
                    self.last_raw = Some(raw);
                }
            }
        }
    }

    /// Copy unusable persisted data aside before anything can overwrite it
    fn quarantine(&mut self, reason: &str) {
        warn!(
            "event=tasks_load status=malformed error=\"{}\" preserved_as={}",
            reason, CORRUPT_TASKS_KEY
        );
        match self.store.copy(TASKS_KEY, CORRUPT_TASKS_KEY) {
            Ok(_) => self.overwrite_blocked = false,
            Err(e) => {
                error!("event=tasks_preserve status=error error=\"{}\"", e);
                self.overwrite_blocked = true;
            }
        }
    }

    fn persist(&mut self) {
        if self.overwrite_blocked {
            let e = StoreError::Unreadable(TASKS_KEY.to_string());
            error!("event=tasks_save status=blocked error=\"{}\"", e);
            self.persist_error = Some(e);
            return;
        }
        let result = codec::encode_tasks(&self.tasks)
            .map_err(StoreError::from)
            .and_then(|raw| self.store.set(TASKS_KEY, &raw).map(|()| raw));
        match result {
            Ok(raw) => self.last_raw = Some(raw),
            Err(e) => {
                error!("event=tasks_save status=error error=\"{}\"", e);
                self.persist_error = Some(e);
            }
        }
    }
}

fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn log_repair(repair: &Repair) {
    match repair {
        Repair::AssignedId { index, id } => {
            warn!("event=task_repair kind=assigned_id index={} id={}", index, id)
        }
        Repair::ReplacedDuplicateId { old, new } => {
            warn!("event=task_repair kind=duplicate_id old={} new={}", old, new)
        }
        Repair::DroppedUntitled { index } => {
            warn!("event=task_repair kind=dropped_untitled index={}", index)
        }
        Repair::DroppedInvalid { index } => {
            warn!("event=task_repair kind=dropped_invalid index={}", index)
        }
        Repair::ResetCreatedAt { id } => {
            debug!("event=task_repair kind=reset_created_at id={}", id)
        }
        Repair::Normalized { id, field } => {
            debug!("event=task_repair kind=normalized id={} field={}", id, field)
        }
    }
}

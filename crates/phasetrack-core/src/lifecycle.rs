use crate::config::Config;
use crate::context::ContextManager;
use crate::error::{PhasetrackError, Result};
use crate::phase::PhaseInfo;
use crate::progress::{self, PhaseProgress};
use crate::store::{TaskSet, TaskStore};
use crate::task::{Note, Task, TaskPatch, TaskRecord};
use crate::timestamp::Timestamp;
use crate::types::TaskStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The operations every surface (CLI, web) drives: status transitions that
/// append a note, stamp `updated`, and open or close the context document.
#[derive(Debug, Clone)]
pub struct Tracker {
    store: TaskStore,
    contexts: ContextManager,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartOutcome {
    pub task: Task,
    pub context_path: PathBuf,
}

/// What the git collaborator needs after a task is completed.
#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome {
    pub task: Task,
    pub message: String,
    pub removed_contexts: Vec<PathBuf>,
}

impl Tracker {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let store = TaskStore::new(root, config);
        let contexts = ContextManager::new(store.layout().clone());
        Self { store, contexts }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn contexts(&self) -> &ContextManager {
        &self.contexts
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn load_tasks(&self) -> TaskSet {
        self.store.load_tasks()
    }

    pub fn phase_progress(&self) -> BTreeMap<u32, PhaseProgress> {
        progress::phase_progress(&self.store.load_tasks())
    }

    pub fn find(&self, task_id: &str) -> Result<Task> {
        self.store
            .load_tasks()
            .find(task_id)
            .cloned()
            .ok_or_else(|| PhasetrackError::TaskNotFound(task_id.to_string()))
    }

    /// Mark in-progress and materialize the context document.
    pub fn start(&self, task_id: &str) -> Result<StartOutcome> {
        let task = self.transition(task_id, TaskStatus::InProgress, "Task started".to_string())?;
        let context_path = self.contexts.generate_context(&task)?;
        tracing::info!(id = task_id, context = %context_path.display(), "task started");
        Ok(StartOutcome { task, context_path })
    }

    /// Mark completed and remove the context document(s).
    pub fn commit(&self, task_id: &str, message: Option<&str>) -> Result<CommitOutcome> {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Complete task: {task_id}"));
        let task = self.transition(
            task_id,
            TaskStatus::Completed,
            format!("Task committed: {message}"),
        )?;
        let removed_contexts = self.contexts.remove_context(task.id(), task.phase)?;
        tracing::info!(id = task_id, removed = removed_contexts.len(), "task completed");
        Ok(CommitOutcome {
            task,
            message,
            removed_contexts,
        })
    }

    pub fn block(&self, task_id: &str, reason: &str) -> Result<Task> {
        self.transition(task_id, TaskStatus::Blocked, format!("Blocked: {reason}"))
    }

    /// Apply an explicit edit. `updated` is stamped unless the patch sets it.
    pub fn edit(&self, task_id: &str, mut patch: TaskPatch) -> Result<Task> {
        if patch.updated.is_none() {
            patch.updated = Some(Timestamp::now());
        }
        self.store.save_task_updates(task_id, &patch)
    }

    pub fn add_task(&self, phase_id: u32, record: TaskRecord) -> Result<Task> {
        self.store.add_task(phase_id, record)
    }

    pub fn create_phase(&self, id: u32, name: &str, description: &str) -> Result<PhaseInfo> {
        self.store.create_phase(id, name, description)
    }

    fn transition(&self, task_id: &str, status: TaskStatus, note: String) -> Result<Task> {
        let current = self.find(task_id)?;
        let mut notes = current.record.notes;
        notes.push(Note::now(note));
        let patch = TaskPatch {
            status: Some(status),
            updated: Some(Timestamp::now()),
            notes: Some(notes),
            ..TaskPatch::default()
        };
        self.store.save_task_updates(task_id, &patch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

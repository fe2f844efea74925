//! The task store: reads the legacy file and every phase file into one
//! merged [`TaskSet`], and writes single-task updates back to the file that
//! owns the task.
//!
//! Loading is best-effort aggregation, not a strict parser. A file that
//! cannot be read or parsed is skipped with a warning and the rest of the
//! data is still returned.
//!
//! There is no locking. Two processes doing read-modify-write on the same
//! file can lose an update; callers that serve concurrent requests must
//! serialize each load-mutate-save cycle themselves.

use crate::config::Config;
use crate::error::{PhasetrackError, Result};
use crate::io;
use crate::paths::{self, Layout};
use crate::phase::{LegacyFile, PhaseFile, PhaseInfo, UNKNOWN_PHASE_NAME};
use crate::task::{Task, TaskOrigin, TaskPatch, TaskRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// TaskSet
// ---------------------------------------------------------------------------

/// Something `load_tasks` skipped or found suspicious.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    SkippedFile { path: PathBuf, reason: String },
    DuplicateId { id: String },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::SkippedFile { path, reason } => {
                write!(f, "skipped {}: {reason}", path.display())
            }
            LoadWarning::DuplicateId { id } => write!(f, "duplicate task id '{id}'"),
        }
    }
}

/// The merged view: legacy tasks first, then phase tasks in phase-filename
/// order (which is not necessarily numeric phase order).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub phases: BTreeMap<u32, PhaseInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LoadWarning>,
}

impl TaskSet {
    /// First task with this id. Duplicate ids resolve to the earliest one.
    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TaskStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TaskStore {
    layout: Layout,
}

impl TaskStore {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            layout: Layout::new(root, config),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Merge the legacy file and every phase file. Never fails.
    pub fn load_tasks(&self) -> TaskSet {
        let mut set = TaskSet::default();

        self.load_legacy(&mut set);
        for path in self.phase_files(&mut set) {
            self.load_phase_file(&path, &mut set);
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for task in &set.tasks {
            if !seen.insert(task.id()) && reported.insert(task.id()) {
                tracing::warn!(id = task.id(), "duplicate task id; first match wins");
                set.warnings.push(LoadWarning::DuplicateId {
                    id: task.id().to_string(),
                });
            }
        }

        set
    }

    fn load_legacy(&self, set: &mut TaskSet) {
        let path = &self.layout.tasks_file;
        let text = match io::read_optional(path) {
            Ok(Some(text)) => text,
            Ok(None) => return,
            Err(e) => return skip(set, path, e.to_string()),
        };
        let doc = match LegacyFile::parse(&text) {
            Ok(doc) => doc,
            Err(e) => return skip(set, path, e.to_string()),
        };
        for record in doc.tasks {
            let phase = record.phase.unwrap_or(0);
            set.tasks.push(Task {
                record,
                phase,
                phase_name: None,
                origin: TaskOrigin::Legacy,
            });
        }
    }

    /// Phase files matching the naming convention, sorted by filename.
    fn phase_files(&self, set: &mut TaskSet) -> Vec<PathBuf> {
        let dir = &self.layout.phases_dir;
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                skip(set, dir, e.to_string());
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(paths::is_phase_filename)
            })
            .collect();
        files.sort();
        files
    }

    fn load_phase_file(&self, path: &Path, set: &mut TaskSet) {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => return skip(set, path, e.to_string()),
        };
        let doc = match PhaseFile::parse(&text) {
            Ok(doc) => doc,
            Err(e) => return skip(set, path, e.to_string()),
        };

        let header = doc.phase.unwrap_or_default();
        let Some(id) = header.id.or_else(|| paths::phase_number_from_filename(&filename)) else {
            return skip(set, path, "phase has no id".to_string());
        };
        let name = header
            .name
            .unwrap_or_else(|| UNKNOWN_PHASE_NAME.to_string());

        let task_count = doc.tasks.len();
        for record in doc.tasks {
            set.tasks.push(Task {
                record,
                phase: id,
                phase_name: Some(name.clone()),
                origin: TaskOrigin::PhaseFile(filename.clone()),
            });
        }

        if let Some(previous) = set.phases.get(&id) {
            tracing::warn!(
                phase = id,
                first = %previous.file,
                second = %filename,
                "two phase files share an id; metadata from the later file is kept"
            );
        }
        set.phases.insert(
            id,
            PhaseInfo {
                id,
                name,
                description: header.description.unwrap_or_default(),
                file: filename,
                task_count,
            },
        );
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Apply `patch` to the first task named `task_id` and rewrite the file
    /// that owns it. Returns the task as it now stands.
    ///
    /// Callers own the note/timestamp conventions; this only merges fields.
    pub fn save_task_updates(&self, task_id: &str, patch: &TaskPatch) -> Result<Task> {
        let set = self.load_tasks();
        let mut task = set
            .find(task_id)
            .cloned()
            .ok_or_else(|| PhasetrackError::TaskNotFound(task_id.to_string()))?;
        task.record.apply(patch);

        match &task.origin {
            TaskOrigin::PhaseFile(filename) => {
                let mut record = task.record.clone();
                record.strip_stamps(false);
                self.replace_in_phase_file(filename, record)?;
            }
            TaskOrigin::Legacy => {
                let mut record = task.record.clone();
                record.strip_stamps(true);
                self.replace_in_legacy_file(record)?;
            }
        }

        if let Some(tag) = patch.phase.filter(|_| task.is_legacy()) {
            task.phase = tag;
        }
        Ok(task)
    }

    /// Re-read the file fresh so unrelated edits made since `load_tasks`
    /// are not clobbered.
    fn replace_in_phase_file(&self, filename: &str, record: TaskRecord) -> Result<()> {
        let path = self.layout.phase_file(filename);
        let mut doc = PhaseFile::parse(&std::fs::read_to_string(&path)?)?;
        let slot = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == record.id)
            .ok_or_else(|| PhasetrackError::TaskNotFound(record.id.clone()))?;
        *slot = record;
        tracing::debug!(file = %path.display(), "rewriting phase file");
        io::atomic_write(&path, doc.to_yaml()?.as_bytes())
    }

    fn replace_in_legacy_file(&self, record: TaskRecord) -> Result<()> {
        let path = &self.layout.tasks_file;
        let text = io::read_optional(path)?.unwrap_or_default();
        let mut doc = LegacyFile::parse(&text)?;
        let slot = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == record.id)
            .ok_or_else(|| PhasetrackError::TaskNotFound(record.id.clone()))?;
        *slot = record;
        tracing::debug!(file = %path.display(), "rewriting legacy task file");
        io::atomic_write(path, doc.to_yaml()?.as_bytes())
    }

    /// Append a new task to the phase file for `phase_id`.
    pub fn add_task(&self, phase_id: u32, mut record: TaskRecord) -> Result<Task> {
        record.id = record.id.trim().to_string();
        if record.id.is_empty() || record.id.contains(&['/', '\\'][..]) {
            return Err(PhasetrackError::InvalidTaskId(record.id));
        }
        if phase_id == 0 {
            return Err(PhasetrackError::InvalidPhase(
                "phase 0 is reserved for legacy tasks".to_string(),
            ));
        }

        let set = self.load_tasks();
        if set.find(&record.id).is_some() {
            return Err(PhasetrackError::TaskExists(record.id));
        }
        let info = set
            .phases
            .get(&phase_id)
            .ok_or(PhasetrackError::PhaseNotFound(phase_id))?;

        let path = self.layout.phase_file(&info.file);
        let mut doc = PhaseFile::parse(&std::fs::read_to_string(&path)?)?;
        record.strip_stamps(false);
        doc.tasks.push(record.clone());
        io::atomic_write(&path, doc.to_yaml()?.as_bytes())?;
        tracing::debug!(file = %path.display(), id = %record.id, "added task");

        Ok(Task {
            record,
            phase: phase_id,
            phase_name: Some(info.name.clone()),
            origin: TaskOrigin::PhaseFile(info.file.clone()),
        })
    }

    /// Write a new, empty phase file named after the phase.
    pub fn create_phase(&self, id: u32, name: &str, description: &str) -> Result<PhaseInfo> {
        if id == 0 {
            return Err(PhasetrackError::InvalidPhase(
                "phase 0 is reserved for legacy tasks".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(PhasetrackError::InvalidPhase(
                "phase name must not be empty".to_string(),
            ));
        }
        let set = self.load_tasks();
        if set.phases.contains_key(&id) {
            return Err(PhasetrackError::PhaseExists(id));
        }

        let filename = paths::phase_filename(id, name);
        let path = self.layout.phase_file(&filename);
        if path.exists() {
            return Err(PhasetrackError::PhaseExists(id));
        }
        let doc = PhaseFile::new(id, name.trim(), description);
        io::atomic_write(&path, doc.to_yaml()?.as_bytes())?;

        Ok(PhaseInfo {
            id,
            name: name.trim().to_string(),
            description: description.to_string(),
            file: filename,
            task_count: 0,
        })
    }
}

fn skip(set: &mut TaskSet, path: &Path, reason: String) {
    tracing::warn!(file = %path.display(), %reason, "skipping unreadable task file");
    set.warnings.push(LoadWarning::SkippedFile {
        path: path.to_path_buf(),
        reason,
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;
    use tempfile::TempDir;

    const SETUP: &str = "phase:\n  id: 1\n  name: Setup\n  description: Get going\ntasks:\n- id: t1\n  description: First\n  status: pending\n- id: t2\n  description: Second\n  status: completed\n";
    const API: &str = "phase:\n  id: 2\n  name: API\ntasks:\n- id: a1\n  description: Client\n  status: in-progress\n";
    const LEGACY: &str = "tasks:\n- id: old1\n  description: Legacy one\n  status: completed\n- id: old2\n  description: Tagged\n  phase: 3\n";

    fn project() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path(), &Config::default());
        (dir, store)
    }

    fn write(dir: &TempDir, rel: &str, body: &str) {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn empty_project_loads_nothing() {
        let (_dir, store) = project();
        let set = store.load_tasks();
        assert!(set.is_empty());
        assert!(set.phases.is_empty());
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn merges_legacy_then_phase_files() {
        let (dir, store) = project();
        write(&dir, "tasks.yaml", LEGACY);
        write(&dir, "phases/phase1_setup.yml", SETUP);
        write(&dir, "phases/phase2_api.yml", API);

        let set = store.load_tasks();
        let ids: Vec<&str> = set.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["old1", "old2", "t1", "t2", "a1"]);

        assert_eq!(set.find("old1").unwrap().phase, 0);
        assert_eq!(set.find("old2").unwrap().phase, 3);
        let t1 = set.find("t1").unwrap();
        assert_eq!(t1.phase, 1);
        assert_eq!(t1.phase_name.as_deref(), Some("Setup"));
        assert_eq!(t1.origin, TaskOrigin::PhaseFile("phase1_setup.yml".to_string()));

        let setup = &set.phases[&1];
        assert_eq!(setup.name, "Setup");
        assert_eq!(setup.description, "Get going");
        assert_eq!(setup.task_count, 2);
        assert!(!set.phases.contains_key(&0));
    }

    #[test]
    fn phase_files_follow_filename_order_not_numeric_order() {
        let (dir, store) = project();
        write(&dir, "phases/phase10_late.yml", "phase:\n  id: 10\n  name: Late\ntasks:\n- id: late\n");
        write(&dir, "phases/phase2_api.yml", API);

        let set = store.load_tasks();
        let ids: Vec<&str> = set.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["late", "a1"]);
    }

    #[test]
    fn non_matching_files_are_ignored() {
        let (dir, store) = project();
        write(&dir, "phases/notes.yml", "tasks:\n- id: nope\n");
        write(&dir, "phases/phase1.yml", "tasks:\n- id: nope2\n");
        write(&dir, "phases/phase1_setup.yml", SETUP);
        assert_eq!(store.load_tasks().len(), 2);
    }

    #[test]
    fn malformed_file_is_skipped_with_warning() {
        let (dir, store) = project();
        write(&dir, "tasks.yaml", "tasks: [unclosed");
        write(&dir, "phases/phase1_setup.yml", SETUP);
        write(&dir, "phases/phase2_bad.yml", "phase: {id: 2\n");

        let set = store.load_tasks();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.warnings
                .iter()
                .filter(|w| matches!(w, LoadWarning::SkippedFile { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn missing_phase_id_falls_back_to_filename() {
        let (dir, store) = project();
        write(&dir, "phases/phase4_misc.yml", "tasks:\n- id: m1\n");
        let set = store.load_tasks();
        assert_eq!(set.find("m1").unwrap().phase, 4);
        assert_eq!(set.phases[&4].name, UNKNOWN_PHASE_NAME);
    }

    #[test]
    fn load_is_idempotent() {
        let (dir, store) = project();
        write(&dir, "tasks.yaml", LEGACY);
        write(&dir, "phases/phase1_setup.yml", SETUP);
        assert_eq!(store.load_tasks(), store.load_tasks());
    }

    #[test]
    fn duplicate_ids_are_kept_and_reported() {
        let (dir, store) = project();
        write(&dir, "tasks.yaml", "tasks:\n- id: t1\n  description: legacy copy\n");
        write(&dir, "phases/phase1_setup.yml", SETUP);

        let set = store.load_tasks();
        assert_eq!(set.tasks.iter().filter(|t| t.id() == "t1").count(), 2);
        assert_eq!(set.find("t1").unwrap().record.description, "legacy copy");
        assert_eq!(
            set.warnings,
            vec![LoadWarning::DuplicateId { id: "t1".to_string() }]
        );
    }

    #[test]
    fn update_phase_task_rewrites_only_that_record() {
        let (dir, store) = project();
        write(&dir, "phases/phase1_setup.yml", SETUP);

        let patch = TaskPatch {
            status: Some(TaskStatus::Blocked),
            output: Some("docs/setup.md".to_string()),
            ..TaskPatch::default()
        };
        let task = store.save_task_updates("t1", &patch).unwrap();
        assert_eq!(task.record.status, TaskStatus::Blocked);

        let set = store.load_tasks();
        let ids: Vec<&str> = set.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        let t1 = set.find("t1").unwrap();
        assert_eq!(t1.record.status, TaskStatus::Blocked);
        assert_eq!(t1.record.output.as_deref(), Some("docs/setup.md"));
        assert_eq!(t1.record.description, "First");
        let t2 = set.find("t2").unwrap();
        assert_eq!(t2.record.status, TaskStatus::Completed);
        assert_eq!(t2.record.description, "Second");
    }

    #[test]
    fn rewrite_keeps_timestamps_quoted() {
        let (dir, store) = project();
        write(
            &dir,
            "phases/phase1_setup.yml",
            "phase:\n  id: 1\n  name: Setup\ntasks:\n- id: t1\n  notes:\n  - timestamp: '2024-05-01T09:30:00.123456'\n    note: Task started\n  updated: '2024-05-01T09:30:00.123456'\n",
        );
        let patch = TaskPatch {
            status: Some(TaskStatus::Blocked),
            ..TaskPatch::default()
        };
        store.save_task_updates("t1", &patch).unwrap();

        let text = std::fs::read_to_string(dir.path().join("phases/phase1_setup.yml")).unwrap();
        assert!(text.contains("  updated: '2024-05-01T09:30:00.123456'\n"), "{text}");
        assert!(text.contains("  - timestamp: '2024-05-01T09:30:00.123456'\n"), "{text}");
    }

    #[test]
    fn odd_timestamps_do_not_hide_the_phase() {
        for stamp in [
            "2024-05-01 09:30:00.123456",
            "2024-05-01",
            "2024-05-01T09:30:00+00:00",
        ] {
            let (dir, store) = project();
            let body = format!(
                "phase:\n  id: 1\n  name: Setup\ntasks:\n- id: t1\n  updated: {stamp}\n  notes:\n  - timestamp: {stamp}\n    note: imported\n- id: t2\n  depends_on: [42]\n"
            );
            write(&dir, "phases/phase1_setup.yml", &body);

            let set = store.load_tasks();
            assert!(set.warnings.is_empty(), "{stamp}: {:?}", set.warnings);
            assert_eq!(set.len(), 2, "{stamp}");
            assert_eq!(set.phases[&1].task_count, 2);
            let t1 = set.find("t1").unwrap();
            assert_eq!(t1.record.updated.as_ref().and_then(|u| u.as_str()), Some(stamp));
            assert!(t1.record.updated.as_ref().unwrap().parse().is_some(), "{stamp}");
            assert_eq!(set.find("t2").unwrap().record.depends_on, vec!["42"]);

            store.add_task(1, TaskRecord::new("t3", "Third")).unwrap();
            let text = std::fs::read_to_string(dir.path().join("phases/phase1_setup.yml")).unwrap();
            assert!(text.contains(&format!("  updated: '{stamp}'\n")), "{text}");
            assert_eq!(store.load_tasks().len(), 3);
        }
    }

    #[test]
    fn stamps_are_never_written_to_phase_files() {
        let (dir, store) = project();
        write(&dir, "phases/phase1_setup.yml", SETUP);
        store
            .save_task_updates("t1", &TaskPatch {
                description: Some("Renamed".to_string()),
                ..TaskPatch::default()
            })
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("phases/phase1_setup.yml")).unwrap();
        assert!(!raw.contains("phase_name"));
        assert!(!raw.contains("phase_file"));
        let doc = PhaseFile::parse(&raw).unwrap();
        assert!(doc.tasks.iter().all(|t| t.phase.is_none()));
        assert_eq!(doc.phase.unwrap().name.as_deref(), Some("Setup"));
    }

    #[test]
    fn legacy_update_keeps_explicit_tag_and_adds_none() {
        let (dir, store) = project();
        write(&dir, "tasks.yaml", LEGACY);
        for id in ["old1", "old2"] {
            store
                .save_task_updates(id, &TaskPatch {
                    status: Some(TaskStatus::Blocked),
                    ..TaskPatch::default()
                })
                .unwrap();
        }
        let doc = LegacyFile::parse(&std::fs::read_to_string(dir.path().join("tasks.yaml")).unwrap())
            .unwrap();
        assert_eq!(doc.tasks[0].phase, None);
        assert_eq!(doc.tasks[1].phase, Some(3));
        assert!(doc.tasks.iter().all(|t| t.status == TaskStatus::Blocked));
    }

    #[test]
    fn legacy_update_drops_stray_stamp_keys() {
        let (dir, store) = project();
        write(
            &dir,
            "tasks.yaml",
            "tasks:\n- id: old1\n  phase_name: Legacy\n  phase_file: tasks.yaml\n  owner: sam\n",
        );
        store
            .save_task_updates("old1", &TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            })
            .unwrap();
        let raw = std::fs::read_to_string(dir.path().join("tasks.yaml")).unwrap();
        assert!(!raw.contains("phase_name"));
        assert!(!raw.contains("phase_file"));
        assert!(raw.contains("owner: sam"));
    }

    #[test]
    fn update_unknown_task_is_an_error_and_writes_nothing() {
        let (dir, store) = project();
        write(&dir, "phases/phase1_setup.yml", SETUP);
        let before = std::fs::read_to_string(dir.path().join("phases/phase1_setup.yml")).unwrap();

        let err = store
            .save_task_updates("missing", &TaskPatch::default())
            .unwrap_err();
        assert!(matches!(err, PhasetrackError::TaskNotFound(id) if id == "missing"));

        let after = std::fs::read_to_string(dir.path().join("phases/phase1_setup.yml")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn update_rereads_file_and_keeps_concurrent_edits() {
        let (dir, store) = project();
        write(&dir, "phases/phase1_setup.yml", SETUP);
        let path = dir.path().join("phases/phase1_setup.yml");

        // Another writer appends a task after our load but before our write.
        let mut doc = PhaseFile::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        doc.tasks.push(TaskRecord::new("t3", "Third"));
        std::fs::write(&path, doc.to_yaml().unwrap()).unwrap();

        store
            .save_task_updates("t1", &TaskPatch {
                status: Some(TaskStatus::InProgress),
                ..TaskPatch::default()
            })
            .unwrap();
        let set = store.load_tasks();
        assert!(set.find("t3").is_some());
    }

    #[test]
    fn add_task_appends_to_phase_file() {
        let (dir, store) = project();
        write(&dir, "phases/phase1_setup.yml", SETUP);
        let task = store.add_task(1, TaskRecord::new("t9", "New")).unwrap();
        assert_eq!(task.phase, 1);

        let ids: Vec<String> = store
            .load_tasks()
            .tasks
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        assert_eq!(ids, vec!["t1", "t2", "t9"]);
    }

    #[test]
    fn add_task_validation() {
        let (dir, store) = project();
        write(&dir, "phases/phase1_setup.yml", SETUP);
        assert!(matches!(
            store.add_task(1, TaskRecord::new("t1", "dup")),
            Err(PhasetrackError::TaskExists(_))
        ));
        assert!(matches!(
            store.add_task(7, TaskRecord::new("x", "nowhere")),
            Err(PhasetrackError::PhaseNotFound(7))
        ));
        assert!(matches!(
            store.add_task(0, TaskRecord::new("x", "legacy")),
            Err(PhasetrackError::InvalidPhase(_))
        ));
        assert!(matches!(
            store.add_task(1, TaskRecord::new("  ", "blank")),
            Err(PhasetrackError::InvalidTaskId(_))
        ));
        assert!(matches!(
            store.add_task(1, TaskRecord::new("../escape", "path")),
            Err(PhasetrackError::InvalidTaskId(_))
        ));
    }

    #[test]
    fn create_phase_writes_conventional_filename() {
        let (dir, store) = project();
        let info = store.create_phase(3, "Data Model", "Schemas").unwrap();
        assert_eq!(info.file, "phase3_data_model.yml");
        assert!(dir.path().join("phases/phase3_data_model.yml").exists());

        let set = store.load_tasks();
        assert_eq!(set.phases[&3].name, "Data Model");
        assert_eq!(set.phases[&3].description, "Schemas");

        assert!(matches!(
            store.create_phase(3, "Again", ""),
            Err(PhasetrackError::PhaseExists(3))
        ));
        assert!(matches!(
            store.create_phase(0, "Zero", ""),
            Err(PhasetrackError::InvalidPhase(_))
        ));
    }
}

use crate::timestamp::Timestamp;
use crate::types::TaskStatus;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Keys the loader stamps onto tasks. They may linger in files written by
/// older tooling and are never written back.
pub const STAMP_KEYS: &[&str] = &["phase_name", "phase_file"];

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub note: String,
}

impl Note {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            timestamp: Some(Timestamp::now()),
            note: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskRecord
// ---------------------------------------------------------------------------

/// A task exactly as persisted in `tasks.yaml` or a phase file.
///
/// Keys this type does not know are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Explicit phase tag. Only meaningful in the legacy file; phase files
    /// carry their id in the header instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
    #[serde(
        default,
        deserialize_with = "strings_or_numbers",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Drop the loader stamps before writing. `keep_phase_tag` is true for
    /// the legacy file, where an explicit tag is user data.
    pub fn strip_stamps(&mut self, keep_phase_tag: bool) {
        if !keep_phase_tag {
            self.phase = None;
        }
        for key in STAMP_KEYS {
            self.extra.remove(*key);
        }
    }

    /// Shallow merge: every field present in `patch` replaces the old value.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.status {
            self.status = v.clone();
        }
        if let Some(v) = patch.phase {
            self.phase = Some(v);
        }
        if let Some(v) = &patch.output {
            self.output = Some(v.clone());
        }
        if let Some(v) = &patch.context {
            self.context = v.clone();
        }
        if let Some(v) = &patch.tests {
            self.tests = Some(v.clone());
        }
        if let Some(v) = &patch.depends_on {
            self.depends_on = v.clone();
        }
        if let Some(v) = &patch.acceptance_criteria {
            self.acceptance_criteria = v.clone();
        }
        if let Some(v) = &patch.notes {
            self.notes = v.clone();
        }
        if let Some(v) = &patch.updated {
            self.updated = Some(v.clone());
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Ids may be written bare, so YAML hands some of them over as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdScalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl IdScalar {
    fn into_string(self) -> String {
        match self {
            IdScalar::Str(s) => s,
            IdScalar::Int(n) => n.to_string(),
            IdScalar::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(IdScalar::deserialize(deserializer)?.into_string())
}

fn strings_or_numbers<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Option::<Vec<IdScalar>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(ids.into_iter().map(IdScalar::into_string).collect())
}

// ---------------------------------------------------------------------------
// TaskPatch
// ---------------------------------------------------------------------------

/// A partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

// ---------------------------------------------------------------------------
// Task (loaded view)
// ---------------------------------------------------------------------------

/// Which file owns a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskOrigin {
    Legacy,
    PhaseFile(String),
}

impl TaskOrigin {
    pub fn phase_file(&self) -> Option<&str> {
        match self {
            TaskOrigin::Legacy => None,
            TaskOrigin::PhaseFile(name) => Some(name),
        }
    }
}

/// A record plus the stamps computed at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub record: TaskRecord,
    /// 0 for legacy tasks without a tag.
    pub phase: u32,
    pub phase_name: Option<String>,
    pub origin: TaskOrigin,
}

impl Task {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn status(&self) -> &TaskStatus {
        &self.record.status
    }

    pub fn is_legacy(&self) -> bool {
        self.origin == TaskOrigin::Legacy
    }

    /// Phase name for display; legacy tasks have none.
    pub fn phase_label(&self) -> &str {
        self.phase_name.as_deref().unwrap_or("Legacy")
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut value =
            serde_json::to_value(&self.record).map_err(serde::ser::Error::custom)?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("phase".to_string(), self.phase.into());
            map.insert(
                "phase_name".to_string(),
                self.phase_name.clone().into(),
            );
            map.insert(
                "phase_file".to_string(),
                self.origin.phase_file().map(str::to_string).into(),
            );
        }
        value.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

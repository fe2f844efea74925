use crate::error::Result;
use crate::task::TaskRecord;
use crate::timestamp::quote_timestamps;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_PHASE_NAME: &str = "Unknown Phase";

// ---------------------------------------------------------------------------
// On-disk documents
// ---------------------------------------------------------------------------

/// The `phase:` block at the top of a phase file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One `phases/phase{N}_{name}.yml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseHeader>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<TaskRecord>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The pre-phase `tasks.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyFile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<TaskRecord>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PhaseFile {
    pub fn new(id: u32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            phase: Some(PhaseHeader {
                id: Some(id),
                name: Some(name.into()),
                description: Some(description.into()),
                extra: BTreeMap::new(),
            }),
            tasks: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        parse_document(text)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(quote_timestamps(&serde_yaml::to_string(self)?))
    }
}

impl LegacyFile {
    pub fn parse(text: &str) -> Result<Self> {
        parse_document(text)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(quote_timestamps(&serde_yaml::to_string(self)?))
    }
}

/// An empty (or comment-only) document is an empty store, not an error.
fn parse_document<T>(text: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_value(value)?)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// PhaseInfo
// ---------------------------------------------------------------------------

/// Phase metadata as seen by readers: header fields plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseInfo {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub file: String,
    pub task_count: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

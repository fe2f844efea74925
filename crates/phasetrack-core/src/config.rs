use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Project layout, read from `.phasetrack.yaml` at the project root.
///
/// Every path is relative to the root. A missing file means all defaults,
/// matching the layout the tool has always used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,
    #[serde(default = "default_phases_dir")]
    pub phases_dir: String,
    #[serde(default = "default_contexts_dir")]
    pub contexts_dir: String,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
    #[serde(default = "default_src_dir")]
    pub src_dir: String,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_tasks_file() -> String {
    paths::DEFAULT_TASKS_FILE.to_string()
}

fn default_phases_dir() -> String {
    paths::DEFAULT_PHASES_DIR.to_string()
}

fn default_contexts_dir() -> String {
    paths::DEFAULT_CONTEXTS_DIR.to_string()
}

fn default_docs_dir() -> String {
    paths::DEFAULT_DOCS_DIR.to_string()
}

fn default_src_dir() -> String {
    paths::DEFAULT_SRC_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            phases_dir: default_phases_dir(),
            contexts_dir: default_contexts_dir(),
            docs_dir: default_docs_dir(),
            src_dir: default_src_dir(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, or the defaults when the project has none.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let Some(data) = crate::io::read_optional(&path)? else {
            return Ok(Self::default());
        };
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let entries = [
            ("tasks_file", &self.tasks_file),
            ("phases_dir", &self.phases_dir),
            ("contexts_dir", &self.contexts_dir),
            ("docs_dir", &self.docs_dir),
            ("src_dir", &self.src_dir),
        ];

        for (key, value) in entries {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("'{key}' must not be empty"),
                });
            } else if Path::new(value).is_absolute() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("'{key}' is absolute ({value}); paths are usually root-relative"),
                });
            }
        }

        if self.phases_dir == self.contexts_dir {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "phases_dir and contexts_dir are both '{}'; context documents would mix with phase files",
                    self.phases_dir
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::config::Config;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = ".phasetrack.yaml";

pub const DEFAULT_TASKS_FILE: &str = "tasks.yaml";
pub const DEFAULT_PHASES_DIR: &str = "phases";
pub const DEFAULT_CONTEXTS_DIR: &str = "contexts";
pub const DEFAULT_DOCS_DIR: &str = "docs";
pub const DEFAULT_SRC_DIR: &str = "src";

pub const PHASE_FILE_EXT: &str = "yml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Absolute locations of everything the store touches, resolved once from
/// the project root and its [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub tasks_file: PathBuf,
    pub phases_dir: PathBuf,
    pub contexts_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub src_dir: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        Self {
            tasks_file: root.join(&config.tasks_file),
            phases_dir: root.join(&config.phases_dir),
            contexts_dir: root.join(&config.contexts_dir),
            docs_dir: root.join(&config.docs_dir),
            src_dir: root.join(&config.src_dir),
            root,
        }
    }

    pub fn phase_file(&self, filename: &str) -> PathBuf {
        self.phases_dir.join(filename)
    }

    /// `contexts/phase{N}`
    pub fn phase_context_dir(&self, phase: u32) -> PathBuf {
        self.contexts_dir.join(format!("phase{phase}"))
    }

    /// `contexts/phase{N}/context_{id}.md`
    pub fn context_file(&self, phase: u32, task_id: &str) -> PathBuf {
        self.phase_context_dir(phase)
            .join(format!("context_{task_id}.md"))
    }

    /// Dot-prefixed context file at the project root, from the layout that
    /// predates per-phase context directories.
    pub fn legacy_context_file(&self, task_id: &str) -> PathBuf {
        self.root.join(format!(".task_context_{task_id}.md"))
    }
}

// ---------------------------------------------------------------------------
// Phase filenames
// ---------------------------------------------------------------------------

static PHASE_FILE_RE: OnceLock<Regex> = OnceLock::new();
static PHASE_NUM_RE: OnceLock<Regex> = OnceLock::new();

fn phase_file_re() -> &'static Regex {
    PHASE_FILE_RE.get_or_init(|| Regex::new(r"^phase[^/\\]*_[^/\\]*\.yml$").unwrap())
}

fn phase_num_re() -> &'static Regex {
    PHASE_NUM_RE.get_or_init(|| Regex::new(r"^phase(\d+)").unwrap())
}

/// Whether `filename` follows the `phase*_*.yml` convention.
pub fn is_phase_filename(filename: &str) -> bool {
    phase_file_re().is_match(filename)
}

/// Leading phase number of a phase filename (`phase3_api.yml` → 3).
pub fn phase_number_from_filename(filename: &str) -> Option<u32> {
    phase_num_re()
        .captures(filename)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Lowercase, spaces and hyphens folded to underscores. Path separators are
/// folded too so the result is always a single filename.
pub fn normalize_phase_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// `phase{id}_{normalized name}.yml`
pub fn phase_filename(id: u32, name: &str) -> String {
    format!("phase{id}_{}.{PHASE_FILE_EXT}", normalize_phase_name(name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

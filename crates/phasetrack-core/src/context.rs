//! Per-task context documents.
//!
//! Starting a task writes `contexts/phase{N}/context_{id}.md`, a Markdown
//! bundle of the task's description and the files it references, for hand-off
//! to a coding session. Completing the task deletes it again. Which lifecycle
//! step triggers what lives in [`crate::lifecycle`]; this module only renders,
//! writes and removes.

use crate::error::Result;
use crate::io;
use crate::paths::Layout;
use crate::task::Task;
use regex::Regex;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ContextManager {
    layout: Layout,
}

/// Result of looking up one `path[#section]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedReference {
    Found { path: PathBuf, content: String },
    NotFound,
}

impl ContextManager {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn context_path(&self, phase: u32, task_id: &str) -> PathBuf {
        self.layout.context_file(phase, task_id)
    }

    /// Render and write the context document. Returns its path.
    pub fn generate_context(&self, task: &Task) -> Result<PathBuf> {
        let path = self.context_path(task.phase, task.id());
        io::ensure_dir(&self.layout.phase_context_dir(task.phase))?;
        io::atomic_write(&path, self.render_context(task).as_bytes())?;
        tracing::debug!(file = %path.display(), "wrote context document");
        Ok(path)
    }

    /// Delete the task's document from every `contexts/phase*` directory
    /// (its own phase first, since the phase tag may have changed after
    /// start) and the old dot-prefixed one at the project root. Returns
    /// whatever was actually removed.
    pub fn remove_context(&self, task_id: &str, phase: u32) -> Result<Vec<PathBuf>> {
        let mut candidates = vec![self.context_path(phase, task_id)];
        candidates.extend(
            self.other_phase_context_dirs(phase)?
                .into_iter()
                .map(|dir| dir.join(format!("context_{task_id}.md"))),
        );
        candidates.push(self.layout.legacy_context_file(task_id));

        let mut removed = Vec::new();
        for path in candidates {
            if io::remove_if_exists(&path)? {
                removed.push(path);
            }
        }
        Ok(removed)
    }

    /// `contexts/phase*` directories other than `phase`'s own, by name.
    fn other_phase_context_dirs(&self, phase: u32) -> Result<Vec<PathBuf>> {
        let own = self.layout.phase_context_dir(phase);
        let entries = match std::fs::read_dir(&self.layout.contexts_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut dirs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_phase_dir = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("phase"));
            if is_phase_dir && path.is_dir() && path != own {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Existing context document for a task, new layout first.
    pub fn existing_context(&self, task_id: &str, phase: u32) -> Option<PathBuf> {
        [
            self.context_path(phase, task_id),
            self.layout.legacy_context_file(task_id),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    /// The document text. Reads referenced files but writes nothing.
    pub fn render_context(&self, task: &Task) -> String {
        let rec = &task.record;
        let mut out = String::new();

        let _ = writeln!(out, "# Context for Task: {}\n", rec.id);
        let _ = writeln!(out, "**Phase:** {} - {}", task.phase, task.phase_label());
        let _ = writeln!(out, "**Description:** {}\n", rec.description);
        let _ = writeln!(
            out,
            "**Expected Output:** {}\n",
            rec.output.as_deref().unwrap_or("Not specified")
        );

        if !rec.acceptance_criteria.is_empty() {
            out.push_str("**Acceptance Criteria:**\n");
            for criterion in &rec.acceptance_criteria {
                let _ = writeln!(out, "- {criterion}");
            }
            out.push('\n');
        }

        if !rec.depends_on.is_empty() {
            let _ = writeln!(out, "**Dependencies:** {}\n", rec.depends_on.join(", "));
        }

        out.push_str("## Context Documentation:\n\n");

        if rec.context.is_empty() {
            out.push_str("No context files specified.\n");
        } else {
            out.push_str(&self.bundle_references(&rec.context));
        }
        out
    }

    fn bundle_references(&self, references: &[String]) -> String {
        let blocks: Vec<String> = references
            .iter()
            .map(|reference| match self.resolve_reference(reference) {
                ResolvedReference::Found { content, .. } => {
                    format!("=== {reference} ===\n{content}\n")
                }
                ResolvedReference::NotFound => {
                    tracing::warn!(%reference, "context file not found");
                    format!("=== {reference} (NOT FOUND) ===\n")
                }
            })
            .collect();
        blocks.join("\n")
    }

    /// Look `reference` up relative to the root, then `docs/`, then `src/`,
    /// then as an absolute path. A `#section` suffix narrows the content to
    /// that definition.
    pub fn resolve_reference(&self, reference: &str) -> ResolvedReference {
        let (file, section) = match reference.split_once('#') {
            Some((file, section)) => (file, Some(section)),
            None => (reference, None),
        };

        let candidates = [
            self.layout.root.join(file),
            self.layout.docs_dir.join(file),
            self.layout.src_dir.join(file),
            PathBuf::from(file),
        ];
        let Some(path) = candidates.into_iter().find(|p| p.is_file()) else {
            return ResolvedReference::NotFound;
        };
        let Ok(content) = read_lossy(&path) else {
            return ResolvedReference::NotFound;
        };

        let content = match section {
            Some(name) => extract_section(&content, name).unwrap_or(content),
            None => content,
        };
        ResolvedReference::Found { path, content }
    }
}

fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lines from the first `def name` / `class name` up to, not including, the
/// next top-level definition or blank line. `None` if there is no such
/// definition.
pub fn extract_section(content: &str, name: &str) -> Option<String> {
    let start = Regex::new(&format!(
        r"^\s*(?:async\s+)?(?:def|class)\s+{}\b",
        regex::escape(name)
    ))
    .ok()?;

    let mut lines = content.lines();
    let first = lines.by_ref().find(|line| start.is_match(line))?;

    let mut section = vec![first];
    section.extend(
        lines.take_while(|line| !line.trim().is_empty() && !is_top_level_definition(line)),
    );
    Some(section.join("\n"))
}

fn is_top_level_definition(line: &str) -> bool {
    line.starts_with("def ") || line.starts_with("class ") || line.starts_with("async def ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::task::{TaskOrigin, TaskRecord};
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> ContextManager {
        ContextManager::new(Layout::new(dir.path(), &Config::default()))
    }

    fn task(id: &str, phase: u32, context: &[&str]) -> Task {
        let mut record = TaskRecord::new(id, "Build the loader");
        record.context = context.iter().map(|s| s.to_string()).collect();
        Task {
            record,
            phase,
            phase_name: Some("Setup".to_string()),
            origin: TaskOrigin::PhaseFile("phase1_setup.yml".to_string()),
        }
    }

    const FOO_PY: &str = "import os\n\ndef bar(x):\n    return x + 1\n\ndef baz():\n    pass\n";

    #[test]
    fn section_extraction_stops_at_blank_line() {
        let section = extract_section(FOO_PY, "bar").unwrap();
        assert_eq!(section, "def bar(x):\n    return x + 1");
    }

    #[test]
    fn section_extraction_stops_at_next_definition() {
        let src = "class Loader:\n    pass\nclass Other:\n    pass\n";
        assert_eq!(extract_section(src, "Loader").unwrap(), "class Loader:\n    pass");
    }

    #[test]
    fn section_name_must_match_whole_identifier() {
        assert!(extract_section("def barbaz():\n    pass\n", "bar").is_none());
    }

    #[test]
    fn resolves_section_reference_under_src() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/foo.py"), FOO_PY).unwrap();

        let resolved = manager(&dir).resolve_reference("src/foo.py#bar");
        match resolved {
            ResolvedReference::Found { content, .. } => {
                assert_eq!(content, "def bar(x):\n    return x + 1");
            }
            ResolvedReference::NotFound => panic!("expected src/foo.py to resolve"),
        }
    }

    #[test]
    fn missing_section_falls_back_to_whole_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/foo.py"), FOO_PY).unwrap();

        let resolved = manager(&dir).resolve_reference("foo.py#nope");
        assert!(matches!(resolved, ResolvedReference::Found { content, .. } if content == FOO_PY));
    }

    #[test]
    fn resolution_order_prefers_root_over_docs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("guide.md"), "root copy").unwrap();
        std::fs::write(dir.path().join("docs/guide.md"), "docs copy").unwrap();
        std::fs::write(dir.path().join("docs/only.md"), "docs only").unwrap();

        let m = manager(&dir);
        assert!(matches!(
            m.resolve_reference("guide.md"),
            ResolvedReference::Found { content, .. } if content == "root copy"
        ));
        assert!(matches!(
            m.resolve_reference("only.md"),
            ResolvedReference::Found { content, .. } if content == "docs only"
        ));
    }

    #[test]
    fn absolute_reference_resolves() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let file = elsewhere.path().join("notes.md");
        std::fs::write(&file, "absolute").unwrap();
        let m = manager(&dir);
        assert!(matches!(
            m.resolve_reference(file.to_str().unwrap()),
            ResolvedReference::Found { content, .. } if content == "absolute"
        ));
    }

    #[test]
    fn render_includes_header_and_not_found_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/api.md"), "API notes").unwrap();

        let mut t = task("t1", 1, &["api.md", "missing.md"]);
        t.record.acceptance_criteria = vec!["loads".to_string(), "saves".to_string()];
        t.record.depends_on = vec!["t0".to_string()];

        let doc = manager(&dir).render_context(&t);
        assert!(doc.starts_with("# Context for Task: t1\n"));
        assert!(doc.contains("**Phase:** 1 - Setup"));
        assert!(doc.contains("**Expected Output:** Not specified"));
        assert!(doc.contains("**Acceptance Criteria:**\n- loads\n- saves\n"));
        assert!(doc.contains("**Dependencies:** t0"));
        assert!(doc.contains("=== api.md ===\nAPI notes\n"));
        assert!(doc.contains("=== missing.md (NOT FOUND) ==="));
    }

    #[test]
    fn render_without_references() {
        let dir = TempDir::new().unwrap();
        let doc = manager(&dir).render_context(&task("t1", 1, &[]));
        assert!(doc.ends_with("No context files specified.\n"));
        assert!(!doc.contains("**Acceptance Criteria:**"));
        assert!(!doc.contains("**Dependencies:**"));
    }

    #[test]
    fn generate_then_remove() {
        let dir = TempDir::new().unwrap();
        let m = manager(&dir);
        let path = m.generate_context(&task("t1", 1, &[])).unwrap();
        assert_eq!(path, dir.path().join("contexts/phase1/context_t1.md"));
        assert!(path.is_file());

        let legacy = dir.path().join(".task_context_t1.md");
        std::fs::write(&legacy, "old").unwrap();

        let removed = m.remove_context("t1", 1).unwrap();
        assert_eq!(removed, vec![path.clone(), legacy.clone()]);
        assert!(!path.exists());
        assert!(!legacy.exists());
        assert!(m.existing_context("t1", 1).is_none());
    }

    #[test]
    fn remove_finds_document_under_a_previous_phase() {
        let dir = TempDir::new().unwrap();
        let m = manager(&dir);
        let started = m.generate_context(&task("t1", 3, &[])).unwrap();
        std::fs::create_dir_all(dir.path().join("contexts/archive")).unwrap();
        std::fs::write(dir.path().join("contexts/archive/context_t1.md"), "keep").unwrap();

        let removed = m.remove_context("t1", 5).unwrap();
        assert_eq!(removed, vec![started.clone()]);
        assert!(!started.exists());
        assert!(dir.path().join("contexts/archive/context_t1.md").exists());
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let dir = TempDir::new().unwrap();
        assert!(manager(&dir).remove_context("t1", 1).unwrap().is_empty());
    }
}

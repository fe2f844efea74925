//! `git add .` + `git commit -m` after a task is completed.
//!
//! Git is a collaborator, not a dependency: a missing binary, a directory
//! that is not a repository, or a failing commit only ever produces a warning.

use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOutcome {
    Committed,
    Skipped(String),
    Failed(String),
}

pub fn commit_all(root: &Path, message: &str) -> GitOutcome {
    if which::which("git").is_err() {
        return GitOutcome::Skipped("git not found on PATH".to_string());
    }

    if let Err(reason) = run_git(root, &["add", "."]) {
        return GitOutcome::Failed(format!("git add failed: {reason}"));
    }
    match run_git(root, &["commit", "-m", message]) {
        Ok(()) => GitOutcome::Committed,
        Err(reason) => GitOutcome::Failed(format!("git commit failed: {reason}")),
    }
}

fn run_git(root: &Path, args: &[&str]) -> Result<(), String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|e| e.to_string())?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if stderr.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.trim().to_string()
    };
    Err(detail)
}

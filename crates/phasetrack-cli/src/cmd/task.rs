use crate::cmd::open_tracker;
use crate::git::{self, GitOutcome};
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use clap::Args;
use phasetrack_core::report::{handoff_report, latest_summary};
use phasetrack_core::task::{Task, TaskPatch, TaskRecord};
use phasetrack_core::types::TaskStatus;
use std::path::Path;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Phase to append the task to
    #[arg(long)]
    pub phase: u32,
    /// New task id (unique across all phases)
    pub task_id: String,
    #[arg(required = true)]
    pub description: Vec<String>,
    /// Expected output (file or artifact)
    #[arg(long)]
    pub output: Option<String>,
    /// Context references as comma-separated paths (e.g. docs/api.md,src/app.py#main)
    #[arg(long, value_delimiter = ',')]
    pub context: Vec<String>,
    /// Dependencies as comma-separated task ids
    #[arg(long = "depends", value_delimiter = ',')]
    pub depends_on: Vec<String>,
    /// Acceptance criterion (repeatable)
    #[arg(long = "criterion")]
    pub acceptance_criteria: Vec<String>,
    /// Test command or test file
    #[arg(long)]
    pub tests: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    pub task_id: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Set status directly (pending, in-progress, completed, blocked)
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub output: Option<String>,
    #[arg(long)]
    pub tests: Option<String>,
    /// Replace context references (comma-separated)
    #[arg(long)]
    pub context: Option<String>,
    /// Replace dependencies (comma-separated ids, e.g. t1,t2)
    #[arg(long)]
    pub depends: Option<String>,
    /// Replace acceptance criteria (repeatable)
    #[arg(long = "criterion")]
    pub acceptance_criteria: Vec<String>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

pub fn list(
    root: &Path,
    status: Option<&str>,
    phase: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let set = tracker.load_tasks();
    let status = status.map(|s| TaskStatus::from(s.to_string()));

    let tasks: Vec<&Task> = set
        .tasks
        .iter()
        .filter(|t| status.as_ref().map_or(true, |s| t.status() == s))
        .filter(|t| phase.map_or(true, |p| t.phase == p))
        .collect();

    if json {
        return print_json(&tasks);
    }

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let rows = tasks
        .iter()
        .map(|t| {
            vec![
                t.id().to_string(),
                t.phase.to_string(),
                t.status().to_string(),
                truncate(&t.record.description, 60),
            ]
        })
        .collect();
    print_table(&["ID", "PHASE", "STATUS", "DESCRIPTION"], rows);
    Ok(())
}

pub fn show(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let task = tracker
        .find(task_id)
        .with_context(|| format!("task '{task_id}' not found"))?;

    if json {
        return print_json(&task);
    }

    let rec = &task.record;
    println!("Task:        {}", rec.id);
    println!("Phase:       {} - {}", task.phase, task.phase_label());
    println!("Status:      {}", rec.status);
    println!("Description: {}", rec.description);
    if let Some(output) = &rec.output {
        println!("Output:      {output}");
    }
    if let Some(tests) = &rec.tests {
        println!("Tests:       {tests}");
    }
    if !rec.context.is_empty() {
        println!("Context:     {}", rec.context.join(", "));
    }
    if !rec.depends_on.is_empty() {
        println!("Depends on:  {}", rec.depends_on.join(", "));
    }
    if !rec.acceptance_criteria.is_empty() {
        println!("Acceptance criteria:");
        for criterion in &rec.acceptance_criteria {
            println!("  - {criterion}");
        }
    }
    if !rec.notes.is_empty() {
        println!("Notes:");
        for note in &rec.notes {
            match &note.timestamp {
                Some(ts) => println!("  [{}] {}", ts.short(), note.note),
                None => println!("  {}", note.note),
            }
        }
    }
    if let Some(updated) = &rec.updated {
        println!("Updated:     {}", updated.short());
    }
    match task.origin.phase_file() {
        Some(file) => println!("File:        {file}"),
        None => println!("File:        {}", tracker.store().layout().tasks_file.display()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// start / commit / block
// ---------------------------------------------------------------------------

pub fn start(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let outcome = tracker
        .start(task_id)
        .with_context(|| format!("failed to start task '{task_id}'"))?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("Started task [{task_id}]: {}", outcome.task.record.description);
        println!("Context: {}", outcome.context_path.display());
    }
    Ok(())
}

pub fn commit(
    root: &Path,
    task_id: &str,
    message: Option<&str>,
    use_git: bool,
    json: bool,
) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let outcome = tracker
        .commit(task_id, message)
        .with_context(|| format!("failed to complete task '{task_id}'"))?;

    let git = if use_git {
        git::commit_all(root, &outcome.message)
    } else {
        GitOutcome::Skipped("--no-git".to_string())
    };
    if let GitOutcome::Failed(reason) = &git {
        tracing::warn!("{reason}");
    }

    if json {
        let (git_status, git_detail) = match &git {
            GitOutcome::Committed => ("committed", None),
            GitOutcome::Skipped(d) => ("skipped", Some(d.as_str())),
            GitOutcome::Failed(d) => ("failed", Some(d.as_str())),
        };
        return print_json(&serde_json::json!({
            "task": outcome.task,
            "message": outcome.message,
            "removed_contexts": outcome.removed_contexts,
            "git": git_status,
            "git_detail": git_detail,
        }));
    }

    println!("Completed task [{task_id}]");
    for path in &outcome.removed_contexts {
        println!("Removed context: {}", path.display());
    }
    match &git {
        GitOutcome::Committed => println!("Committed: {}", outcome.message),
        GitOutcome::Skipped(reason) => println!("Git skipped: {reason}"),
        GitOutcome::Failed(reason) => println!("Warning: {reason}"),
    }
    print!(
        "\n{}",
        handoff_report(&outcome.task, TaskStatus::Completed.label(), &outcome.message)
    );
    Ok(())
}

pub fn block(root: &Path, task_id: &str, reason: &str, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let task = tracker
        .block(task_id, reason)
        .with_context(|| format!("failed to block task '{task_id}'"))?;

    if json {
        return print_json(&serde_json::json!({
            "task": task,
            "reason": reason,
        }));
    }

    println!("Blocked task [{task_id}]: {reason}");
    print!(
        "\n{}",
        handoff_report(&task, TaskStatus::Blocked.label(), &format!("Blocked: {reason}"))
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// add / edit
// ---------------------------------------------------------------------------

pub fn add(root: &Path, args: AddArgs, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let mut record = TaskRecord::new(args.task_id.trim(), args.description.join(" "));
    record.output = args.output;
    record.tests = args.tests;
    record.context = args.context;
    record.depends_on = args.depends_on;
    record.acceptance_criteria = args.acceptance_criteria;

    let task = tracker
        .add_task(args.phase, record)
        .with_context(|| format!("failed to add task to phase {}", args.phase))?;

    if json {
        print_json(&task)?;
    } else {
        println!(
            "Added task [{}] to phase {} - {}",
            task.id(),
            task.phase,
            task.phase_label()
        );
    }
    Ok(())
}

pub fn edit(root: &Path, args: EditArgs, json: bool) -> anyhow::Result<()> {
    let patch = TaskPatch {
        description: args.description,
        status: args.status.map(TaskStatus::from),
        output: args.output,
        tests: args.tests,
        context: args.context.as_deref().map(split_list),
        depends_on: args.depends.as_deref().map(split_list),
        acceptance_criteria: (!args.acceptance_criteria.is_empty())
            .then_some(args.acceptance_criteria),
        ..TaskPatch::default()
    };
    if patch.is_empty() {
        anyhow::bail!("nothing to edit: pass at least one field flag");
    }

    let tracker = open_tracker(root)?;
    let task = tracker
        .edit(&args.task_id, patch)
        .with_context(|| format!("failed to edit task '{}'", args.task_id))?;

    if json {
        print_json(&task)?;
    } else {
        println!("Updated task [{}]", task.id());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// context / report
// ---------------------------------------------------------------------------

pub fn context(root: &Path, task_id: &str, write: bool, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let task = tracker
        .find(task_id)
        .with_context(|| format!("task '{task_id}' not found"))?;
    let contexts = tracker.contexts();

    if write {
        let path = contexts
            .generate_context(&task)
            .context("failed to write context document")?;
        if json {
            print_json(&serde_json::json!({ "task_id": task_id, "path": path }))?;
        } else {
            println!("Wrote {}", path.display());
        }
        return Ok(());
    }

    let content = contexts.render_context(&task);
    if json {
        let path = contexts.context_path(task.phase, task.id());
        let existing = contexts.existing_context(task.id(), task.phase);
        print_json(&serde_json::json!({
            "task_id": task_id,
            "path": path,
            "exists": existing.is_some(),
            "content": content,
        }))?;
    } else {
        print!("{content}");
    }
    Ok(())
}

pub fn report(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let task = tracker
        .find(task_id)
        .with_context(|| format!("task '{task_id}' not found"))?;
    let status = task.status().label().to_string();
    let summary = latest_summary(&task).to_string();
    let text = handoff_report(&task, &status, &summary);

    if json {
        print_json(&serde_json::json!({
            "task_id": task_id,
            "status": status,
            "summary": summary,
            "report": text,
        }))?;
    } else {
        print!("{text}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(split_list(" t1, t2 ,,"), vec!["t1", "t2"]);
        assert!(split_list("").is_empty());
    }
}

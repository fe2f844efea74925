use crate::task::Task;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 50;

/// Plain-text status block for handing a task over to the next session.
pub fn handoff_report(task: &Task, status_label: &str, summary: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "STATUS REPORT FOR SESSION HANDOFF");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Task: {}", task.id());
    let _ = writeln!(out, "Phase: {} - {}", task.phase, task.phase_label());
    let _ = writeln!(out, "Status: {status_label}");
    let _ = writeln!(out, "Summary: {summary}");
    if let Some(output) = task.record.output.as_deref().filter(|o| !o.is_empty()) {
        let _ = writeln!(out, "Expected Output: {output}");
    }
    let _ = writeln!(out, "{rule}");
    out
}

/// Summary line for `phasetrack report` when no transition just happened:
/// the most recent note, else the description.
pub fn latest_summary(task: &Task) -> &str {
    task.record
        .notes
        .last()
        .map(|n| n.note.as_str())
        .unwrap_or(task.record.description.as_str())
}

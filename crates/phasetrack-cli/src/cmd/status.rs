use crate::cmd::open_tracker;
use crate::output::{print_json, progress_bar};
use phasetrack_core::progress::{self, PhaseProgress};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PhaseRow<'a> {
    id: u32,
    #[serde(flatten)]
    progress: &'a PhaseProgress,
}

/// Project overview: one progress block per phase plus the rollup.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let set = tracker.load_tasks();
    let per_phase = progress::phase_progress(&set);
    let overall = progress::overall(&per_phase);

    if json {
        let phases: Vec<PhaseRow> = per_phase
            .iter()
            .map(|(id, progress)| PhaseRow { id: *id, progress })
            .collect();
        let warnings: Vec<String> = set.warnings.iter().map(|w| w.to_string()).collect();
        return print_json(&serde_json::json!({
            "phases": phases,
            "overall": overall,
            "warnings": warnings,
        }));
    }

    if per_phase.is_empty() {
        println!("No phases or tasks found under {}", root.display());
        return Ok(());
    }

    for (id, p) in &per_phase {
        let done = if p.is_complete() { " (complete)" } else { "" };
        println!("Phase {id}: {}{done}", p.name);
        println!("   Progress: {}", progress_bar(p));
        println!(
            "   Tasks: {} completed, {} in progress, {} pending",
            p.completed, p.in_progress, p.pending
        );
        if p.blocked > 0 {
            println!("   Blocked: {} tasks", p.blocked);
        }
        if p.unrecognized() > 0 {
            println!("   Other status: {} tasks", p.unrecognized());
        }
        println!();
    }

    println!(
        "Overall: {}  ({}/{} tasks)",
        progress_bar(&overall),
        overall.completed,
        overall.total
    );
    if !set.warnings.is_empty() {
        println!("{} warning(s) while loading; rerun with RUST_LOG=warn for details", set.warnings.len());
    }
    Ok(())
}

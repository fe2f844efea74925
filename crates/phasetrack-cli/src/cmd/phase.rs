use crate::cmd::open_tracker;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use phasetrack_core::progress;
use serde::Serialize;
use std::path::Path;

#[derive(Subcommand)]
pub enum PhaseSubcommand {
    /// List phases with task counts and completion
    List,
    /// Create a new, empty phase file
    Create {
        id: u32,
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Serialize)]
struct PhaseSummary {
    id: u32,
    name: String,
    description: String,
    file: Option<String>,
    total: usize,
    completed: usize,
    percentage: u32,
}

pub fn run(root: &Path, subcmd: PhaseSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PhaseSubcommand::List => list(root, json),
        PhaseSubcommand::Create {
            id,
            name,
            description,
        } => create(root, id, &name.join(" "), &description, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let set = tracker.load_tasks();
    let per_phase = progress::phase_progress(&set);

    let summaries: Vec<PhaseSummary> = per_phase
        .iter()
        .map(|(id, p)| {
            let info = set.phases.get(id);
            PhaseSummary {
                id: *id,
                name: p.name.clone(),
                description: info.map(|i| i.description.clone()).unwrap_or_default(),
                file: info.map(|i| i.file.clone()),
                total: p.total,
                completed: p.completed,
                percentage: p.percentage,
            }
        })
        .collect();

    if json {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("No phases found.");
        return Ok(());
    }

    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.name.clone(),
                s.file.clone().unwrap_or_else(|| "-".to_string()),
                format!("{}/{}", s.completed, s.total),
                format!("{}%", s.percentage),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "FILE", "DONE", "PROGRESS"], rows);
    Ok(())
}

fn create(root: &Path, id: u32, name: &str, description: &str, json: bool) -> anyhow::Result<()> {
    let tracker = open_tracker(root)?;
    let info = tracker
        .create_phase(id, name, description)
        .with_context(|| format!("failed to create phase {id}"))?;

    if json {
        print_json(&info)?;
    } else {
        println!("Created phase {}: {} ({})", info.id, info.name, info.file);
    }
    Ok(())
}

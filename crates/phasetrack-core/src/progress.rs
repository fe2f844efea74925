use crate::store::TaskSet;
use crate::types::TaskStatus;
use serde::Serialize;
use std::collections::BTreeMap;

pub const LEGACY_PHASE_NAME: &str = "Legacy Tasks";

/// Per-phase counts. Derived on every call, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub blocked: usize,
    pub percentage: u32,
}

impl PhaseProgress {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Tasks whose status is not one of the four known values. They count
    /// toward `total` and nothing else.
    pub fn unrecognized(&self) -> usize {
        self.total - (self.completed + self.in_progress + self.pending + self.blocked)
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Progress per phase id.
///
/// Every phase with metadata gets an entry even when empty. Phase 0 appears
/// only when legacy tasks exist; a tag pointing at a phase without a file
/// gets a generic "Phase N" entry.
pub fn phase_progress(set: &TaskSet) -> BTreeMap<u32, PhaseProgress> {
    let mut progress: BTreeMap<u32, PhaseProgress> = set
        .phases
        .iter()
        .map(|(id, info)| (*id, PhaseProgress::named(&info.name)))
        .collect();

    for task in &set.tasks {
        let entry = progress.entry(task.phase).or_insert_with(|| {
            if task.phase == 0 {
                PhaseProgress::named(LEGACY_PHASE_NAME)
            } else {
                PhaseProgress::named(format!("Phase {}", task.phase))
            }
        });
        entry.total += 1;
        match task.status() {
            TaskStatus::Completed => entry.completed += 1,
            TaskStatus::InProgress => entry.in_progress += 1,
            TaskStatus::Pending => entry.pending += 1,
            TaskStatus::Blocked => entry.blocked += 1,
            TaskStatus::Other(_) => {}
        }
    }

    for entry in progress.values_mut() {
        entry.percentage = if entry.total > 0 {
            (entry.completed * 100 / entry.total) as u32
        } else {
            0
        };
    }

    progress
}

/// Whole-project rollup across every phase.
pub fn overall(progress: &BTreeMap<u32, PhaseProgress>) -> PhaseProgress {
    let mut sum = PhaseProgress::named("All Phases");
    for p in progress.values() {
        sum.total += p.total;
        sum.completed += p.completed;
        sum.in_progress += p.in_progress;
        sum.pending += p.pending;
        sum.blocked += p.blocked;
    }
    if sum.total > 0 {
        sum.percentage = (sum.completed * 100 / sum.total) as u32;
    }
    sum
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

pub mod phase;
pub mod serve;
pub mod status;
pub mod task;

use anyhow::{bail, Context};
use phasetrack_core::config::{Config, WarnLevel};
use phasetrack_core::lifecycle::Tracker;
use std::path::Path;

/// Load and validate `.phasetrack.yaml`, then build the tracker every
/// command works through.
pub fn open_tracker(root: &Path) -> anyhow::Result<Tracker> {
    let config = load_config(root)?;
    Ok(Tracker::new(root, &config))
}

pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root)
        .with_context(|| format!("failed to load config under {}", root.display()))?;
    let mut errors = Vec::new();
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Warning => tracing::warn!("config: {}", warning.message),
            WarnLevel::Error => errors.push(warning.message),
        }
    }
    if !errors.is_empty() {
        bail!("invalid config: {}", errors.join("; "));
    }
    Ok(config)
}

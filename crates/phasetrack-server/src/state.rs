use phasetrack_core::config::Config;
use phasetrack_core::lifecycle::Tracker;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
    /// Held across every load-mutate-save cycle. The files themselves are
    /// unlocked, so this only orders writers inside this process.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf, config: &Config) -> Self {
        Self {
            tracker: Tracker::new(root, config),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

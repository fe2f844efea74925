use phasetrack_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `PHASETRACK_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.phasetrack.yaml`, `phases/` or `tasks.yaml`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, is_project_dir)
        .or_else(|| find_upward(&cwd, |dir| dir.join(".git").is_dir()))
        .unwrap_or(cwd)
}

fn is_project_dir(dir: &Path) -> bool {
    dir.join(paths::CONFIG_FILE).is_file()
        || dir.join(paths::DEFAULT_PHASES_DIR).is_dir()
        || dir.join(paths::DEFAULT_TASKS_FILE).is_file()
}

fn find_upward(start: &Path, matches: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| matches(dir))
        .map(Path::to_path_buf)
}

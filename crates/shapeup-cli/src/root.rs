use shapeup_core::paths::PLANNER_DIR;
use std::path::{Path, PathBuf};

/// Resolve the planner root directory.
///
/// Priority:
/// 1. `--root` flag / `SHAPEUP_ROOT` env var (passed in as `explicit`)
/// 2. `~/.shapeup`
/// 3. `./.shapeup`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match home::home_dir() {
        Some(home) => home.join(PLANNER_DIR),
        None => PathBuf::from(".").join(PLANNER_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn default_root_is_a_planner_dir() {
        let result = resolve_root(None);
        assert!(result.ends_with(PLANNER_DIR));
    }
}

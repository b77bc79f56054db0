use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory and key constants
// ---------------------------------------------------------------------------

/// Planner home under the user's home directory.
pub const PLANNER_DIR: &str = ".shapeup";
pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_DATABASE: &str = "planner.redb";

/// Prefix for every key the planner writes to its key-value store.
pub const DEFAULT_KEY_PREFIX: &str = "shapeup-planner";

pub const CURRENT_YEAR_SUFFIX: &str = "current-year";
pub const CYCLE_MODE_SUFFIX: &str = "cycle-mode";
pub const UNDO_SUFFIX: &str = "undo";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the database location. Relative paths are taken from `root`.
pub fn database_path(root: &Path, database: &Path) -> PathBuf {
    if database.is_absolute() {
        database.to_path_buf()
    } else {
        root.join(database)
    }
}

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

pub fn year_key(prefix: &str, year: i32) -> String {
    format!("{prefix}-{year}")
}

pub fn setting_key(prefix: &str, suffix: &str) -> String {
    format!("{prefix}-{suffix}")
}

/// Extract the year from a `"{prefix}-{year}"` key. Preference keys share the
/// prefix and are rejected because their suffix is not a number.
pub fn parse_year_key(prefix: &str, key: &str) -> Option<i32> {
    key.strip_prefix(prefix)?
        .strip_prefix('-')?
        .parse::<i32>()
        .ok()
}

// ---------------------------------------------------------------------------
// Week id validation
// ---------------------------------------------------------------------------

static WEEK_ID_RE: OnceLock<Regex> = OnceLock::new();

fn week_id_re() -> &'static Regex {
    WEEK_ID_RE.get_or_init(|| Regex::new(r"^\d{4}-W(0[1-9]|[1-4]\d|5[0-3])$").unwrap())
}

/// Shape check for `YYYY-Wnn`. Does not check that the year has that week.
pub fn is_week_id(id: &str) -> bool {
    week_id_re().is_match(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file, relative to the planner root unless absolute.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_database() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATABASE)
}

fn default_key_prefix() -> String {
    paths::DEFAULT_KEY_PREFIX.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            key_prefix: default_key_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub storage: StorageConfig,
    /// How many undo snapshots to keep.
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
}

fn default_version() -> u32 {
    1
}

fn default_undo_depth() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            storage: StorageConfig::default(),
            undo_depth: default_undo_depth(),
        }
    }
}

impl Config {
    /// Load `<root>/config.yaml`, falling back to defaults when it is missing.
    pub fn load(root: &Path) -> Result<Self> {
        match crate::io::read_optional(&paths::config_path(root))? {
            Some(text) => Ok(serde_yaml::from_str(&text)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        paths::database_path(root, &self.storage.database)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let prefix = &self.storage.key_prefix;

        if prefix.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "storage.key_prefix must not be empty".to_string(),
            });
        } else if prefix.chars().any(char::is_whitespace) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("storage.key_prefix '{prefix}' contains whitespace"),
            });
        }

        if self.storage.database.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "storage.database must not be empty".to_string(),
            });
        } else if self.storage.database.is_absolute() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "storage.database '{}' is outside the planner root",
                    self.storage.database.display()
                ),
            });
        }

        if self.undo_depth == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "undo_depth is 0; undo is disabled".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

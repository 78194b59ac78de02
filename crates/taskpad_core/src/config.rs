//! Store configuration.
//!
//! # Responsibility
//! - Resolve where the task database lives and how large it may grow.
//!
//! # Invariants
//! - The slot key is fixed; only location and quota are configurable.

use std::path::PathBuf;

/// Fixed backing-store slot holding the serialized collection.
pub const TASKS_SLOT_KEY: &str = "tasks";
/// Overrides the database file location.
pub const DB_PATH_ENV: &str = "TASKPAD_DB_PATH";
/// Overrides the slot byte quota; `0` or `none` disables it.
pub const QUOTA_BYTES_ENV: &str = "TASKPAD_QUOTA_BYTES";
/// Matches the common 5 MiB browser local-storage budget.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_DB_FILE_NAME: &str = "taskpad.sqlite3";

/// Location and size policy for the SQLite slot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub quota_bytes: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl StoreConfig {
    /// Reads `TASKPAD_DB_PATH` and `TASKPAD_QUOTA_BYTES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable lookup. Blank values fall back to
    /// defaults; an unparseable quota keeps the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.db_path = PathBuf::from(trimmed);
            }
        }

        if let Some(raw) = lookup(QUOTA_BYTES_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "" => {}
                "0" | "none" => config.quota_bytes = None,
                other => {
                    if let Ok(bytes) = other.parse::<usize>() {
                        config.quota_bytes = Some(bytes);
                    }
                }
            }
        }

        config
    }
}

//! Local libSQL database configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".milepost/milepost.db".to_string()
}

/// Matches `mp_db::DEFAULT_BUSY_TIMEOUT`.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the database file. Relative paths resolve against the
    /// current directory.
    #[serde(default = "default_path")]
    pub path: String,

    /// How long a writer waits for a competing write lock before the
    /// attempt fails as a conflict.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// `:memory:` keeps nothing on disk; useful for dry runs.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

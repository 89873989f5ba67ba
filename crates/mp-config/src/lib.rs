//! # mp-config
//!
//! Layered configuration loading for Milepost using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MILEPOST_*` prefix, `__` as separator)
//! 2. Project-level `.milepost/config.toml`
//! 3. User-level `~/.config/milepost/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `MILEPOST_DATABASE__PATH` -> `database.path`,
//! `MILEPOST_PROPAGATION__RETRY_ATTEMPTS` -> `propagation.retry_attempts`, etc.
//!
//! ```no_run
//! use mp_config::MpConfig;
//!
//! let config = MpConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod general;
mod propagation;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use propagation::PropagationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory holding the project-local config file and default database.
pub const LOCAL_DIR: &str = ".milepost";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MpConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl MpConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env`; see [`MpConfig::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load `.env` from the workspace root, then [`MpConfig::load`].
    ///
    /// # Errors
    ///
    /// Same as [`MpConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on extraction failure or invalid values.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.propagation.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("MILEPOST_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("milepost").join("config.toml"))
    }

    /// Walks up from `CARGO_MANIFEST_DIR` looking for `.env`, falling back to
    /// the current directory. Missing files are ignored.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

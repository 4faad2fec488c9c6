//! # mark-config
//!
//! Layered configuration loading for the marking engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MARKABLE_*` prefix, `__` as separator)
//! 2. Project-level `.markable/config.toml`
//! 3. User-level `~/.config/markable/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MARKABLE_DATABASE__PATH` -> `database.path`,
//! `MARKABLE_RECLAIM__PAGE_SIZE` -> `reclaim.page_size`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use mark_config::MarkConfig;
//!
//! let config = MarkConfig::load_with_dotenv().expect("config");
//! let registry = config.entities.build_registry().into_shared();
//! println!("{} marker types", registry.known_marker_types().len());
//! ```

mod database;
mod entities;
mod error;
mod reclaim;

pub use database::DatabaseConfig;
pub use entities::{EntitiesConfig, EntityConfig, MarkRule, is_identifier};
pub use error::ConfigError;
pub use reclaim::ReclaimConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarkConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reclaim: ReclaimConfig,
    #[serde(default)]
    pub entities: EntitiesConfig,
}

impl MarkConfig {
    /// Load and validate configuration from TOML files and environment
    /// variables.
    ///
    /// Does NOT call `dotenvy`; use [`MarkConfig::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory first, then [`MarkConfig::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load from an explicit TOML file layered over defaults, with
    /// environment variables still taking precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.into()))
            .merge(Env::prefixed("MARKABLE_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".markable/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("MARKABLE_").split("__"))
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reclaim.validate()?;
        self.entities.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("markable").join("config.toml"))
    }
}

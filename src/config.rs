//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/gradebook/gradebook.toml`
//! 3. Explicit config file given with `--config`
//! 4. Environment variables: `GRADEBOOK_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Default SQLite busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite path, `:memory:`, `file:` URI or `sqlite://` path
    pub url: String,
    /// How long to wait for another writer's lock
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Raw database config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDatabaseConfig {
    pub url: Option<String>,
    pub busy_timeout_ms: Option<u64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub database: RawDatabaseConfig,
}

/// Unified configuration for gradebook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
}

/// `<XDG data dir>/gradebook.db`, or `gradebook.db` in the working directory.
fn default_database_url() -> String {
    ProjectDirs::from("", "", "gradebook")
        .map(|dirs| dirs.data_dir().join("gradebook.db"))
        .unwrap_or_else(|| PathBuf::from("gradebook.db"))
        .to_string_lossy()
        .into_owned()
}

/// Get the XDG config directory for gradebook.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gradebook").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("gradebook.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in the database url.
    fn expand_paths(&mut self) {
        self.database.url = expand_env_vars(&self.database.url);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            database: DatabaseConfig {
                url: overlay
                    .database
                    .url
                    .clone()
                    .unwrap_or_else(|| self.database.url.clone()),
                busy_timeout_ms: overlay
                    .database
                    .busy_timeout_ms
                    .unwrap_or(self.database.busy_timeout_ms),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), config_file)
    }

    /// Load settings from the given global and explicit files, then the environment.
    pub fn load_from(
        global_file: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_file {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply GRADEBOOK_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("GRADEBOOK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("database.url") {
            settings.database.url = val;
        }
        if let Ok(val) = config.get::<u64>("database.busy_timeout_ms") {
            settings.database.busy_timeout_ms = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# gradebook configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/gradebook/gradebook.toml
#   Explicit: gradebook --config <file>
#   Env:      GRADEBOOK_DATABASE__URL, GRADEBOOK_DATABASE__BUSY_TIMEOUT_MS

[database]
# SQLite database: a path, ":memory:", a "file:" URI or "sqlite://<path>".
# ~ and $VAR are expanded.
# url = "~/.local/share/gradebook/gradebook.db"

# Milliseconds to wait when another process holds the write lock
# busy_timeout_ms = 5000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

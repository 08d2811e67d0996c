//! Configuration for tubescope-live
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (`--bind`, `--api-key`)
//! 2. Environment variables (`TUBESCOPE_API_KEY`, `TUBESCOPE_BIND`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! Mesh timing (refresh period, restart budget, ask timeout) is process-wide;
//! no setting here is per connection.

use serde::Deserialize;
use std::time::Duration;
use tubescope_common::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "TUBESCOPE_CONFIG";

/// Environment variable overriding the catalog API key
pub const API_KEY_ENV_VAR: &str = "TUBESCOPE_API_KEY";

/// Module name, also used for the default config file name
pub const MODULE_NAME: &str = "tubescope-live";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub mesh: MeshSettings,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            logging: LoggingConfig::default(),
            catalog: CatalogSettings::default(),
            mesh: MeshSettings::default(),
        }
    }
}

impl TomlConfig {
    /// Apply environment overrides that sit above the TOML file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
            if !key.trim().is_empty() {
                self.catalog.api_key = Some(key);
            }
        }
    }

    /// Reject settings the mesh cannot run with
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;
        if self.catalog.max_results == 0 {
            return Err(Error::Config("catalog.max_results must be at least 1".to_string()));
        }
        if self.catalog.request_timeout_ms == 0 {
            return Err(Error::Config("catalog.request_timeout_ms must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Fallback log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Video catalog API settings
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// API key; may also come from `TUBESCOPE_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Items requested per search
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            api_key: None,
            max_results: default_max_results(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl CatalogSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// What to do when one item's detail fetch fails during fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetailFailurePolicy {
    /// Keep the item with the snippet description from the search result
    #[default]
    KeepSnippet,
    /// Fail the whole run; the client receives the error string
    Abort,
}

/// Actor mesh settings
#[derive(Debug, Clone, Deserialize)]
pub struct MeshSettings {
    /// Period between refresh broadcasts
    #[serde(default = "default_refresh_period_secs")]
    pub refresh_period_secs: u64,

    /// Restarts tolerated per worker inside the restart window
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,

    /// Rolling window for the restart budget
    #[serde(default = "default_restart_window_secs")]
    pub restart_window_secs: u64,

    /// Resolution and response timeout for every addressed call
    #[serde(default = "default_ask_timeout_ms")]
    pub ask_timeout_ms: u64,

    /// Remembered queries per session
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default)]
    pub detail_failure: DetailFailurePolicy,

    /// Supervisor mailbox depth
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            refresh_period_secs: default_refresh_period_secs(),
            max_restarts: default_max_restarts(),
            restart_window_secs: default_restart_window_secs(),
            ask_timeout_ms: default_ask_timeout_ms(),
            history_capacity: default_history_capacity(),
            detail_failure: DetailFailurePolicy::default(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

impl MeshSettings {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_period_secs)
    }

    pub fn restart_window(&self) -> Duration {
        Duration::from_secs(self.restart_window_secs)
    }

    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.refresh_period_secs == 0, "mesh.refresh_period_secs"),
            (self.max_restarts == 0, "mesh.max_restarts"),
            (self.restart_window_secs == 0, "mesh.restart_window_secs"),
            (self.ask_timeout_ms == 0, "mesh.ask_timeout_ms"),
            (self.history_capacity == 0, "mesh.history_capacity"),
            (self.mailbox_capacity == 0, "mesh.mailbox_capacity"),
        ];
        for (invalid, name) in checks {
            if invalid {
                return Err(Error::Config(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:9000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_max_results() -> u32 {
    50
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_refresh_period_secs() -> u64 {
    45
}

fn default_max_restarts() -> u32 {
    10
}

fn default_restart_window_secs() -> u64 {
    40
}

fn default_ask_timeout_ms() -> u64 {
    2_000
}

fn default_history_capacity() -> usize {
    tubescope_common::history::DEFAULT_HISTORY_CAPACITY
}

fn default_mailbox_capacity() -> usize {
    256
}

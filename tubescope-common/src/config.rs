//! Configuration file resolution and loading
//!
//! Config file location follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`<config_dir>/tubescope/<module>.toml`)
//!
//! A missing file is not fatal: the caller gets built-in defaults and a warning
//! is logged. A file that exists but cannot be read or parsed is an error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config directory
pub const CONFIG_DIR_NAME: &str = "tubescope";

/// Resolve the configuration file path for a module
///
/// # Arguments
/// * `cli_arg` - Path given on the command line, if any
/// * `env_var_name` - Environment variable consulted when no CLI path is given
/// * `module_name` - Module name used for the default file name (e.g. "tubescope-live")
///
/// Returns `None` only when no CLI/env path is given and the platform has no
/// config directory.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    module_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    default_config_path(module_name)
}

/// Platform default config file path for a module
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(format!("{}.toml", module_name)))
}

/// Load a TOML configuration file, falling back to defaults when it is missing
///
/// # Errors
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_toml<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load configuration from an optional path
///
/// `None` means no location could be determined; defaults are used.
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => load_toml(path),
        None => {
            warn!("No config directory available on this platform, using built-in defaults");
            Ok(T::default())
        }
    }
}

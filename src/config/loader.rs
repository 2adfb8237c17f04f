//! Discovery and loading of `tilelink.toml`

use super::schema::TilelinkConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked for by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "tilelink.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse tilelink.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI flags that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub strict: Option<bool>,
    pub keep_partial: Option<bool>,
    pub log_level: Option<String>,
}

/// Find `tilelink.toml` by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find `tilelink.toml` by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from `path`, or from a discovered file when `path` is
/// `None`. With nothing to load, returns the defaults.
pub fn load_config(path: Option<&Path>) -> Result<TilelinkConfig, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match find_config() {
            Some(p) => p,
            None => return Ok(TilelinkConfig::default()),
        },
    };

    log::debug!("loading config from {}", config_path.display());
    load_config_file(&config_path)
}

fn load_config_file(path: &Path) -> Result<TilelinkConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TilelinkConfig = toml::from_str(&content)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Apply CLI overrides on top of a loaded configuration.
pub fn merge_cli_overrides(config: &mut TilelinkConfig, overrides: &CliOverrides) {
    if let Some(strict) = overrides.strict {
        config.compile.strict = strict;
    }
    if let Some(keep_partial) = overrides.keep_partial {
        config.link.keep_partial = keep_partial;
    }
    if let Some(ref level) = overrides.log_level {
        config.log.level = level.clone();
    }
}

//! Schema for `tilelink.toml`
//!
//! Every section and field is optional; a missing file is the same as an
//! empty one.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilelinkConfig {
    pub compile: CompileConfig,
    pub link: LinkConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// `[compile]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Treat any compile warning as a failure.
    pub strict: bool,
}

/// `[link]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Leave a partially written canvas on disk after a failed link.
    pub keep_partial: bool,
}

/// `[output]` section, shared by `compile` and `link`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub compression: Compression,
}

/// zlib effort used for written PNGs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Default,
    Fast,
    Best,
}

impl Compression {
    pub fn to_png(self) -> png::Compression {
        match self {
            Compression::Default => png::Compression::Default,
            Compression::Fast => png::Compression::Fast,
            Compression::Best => png::Compression::Best,
        }
    }
}

/// Log level names accepted in `[log] level`.
pub const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl TilelinkConfig {
    /// Check values serde cannot check by itself.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            errors.push(ConfigValidationError {
                field: "log.level".to_string(),
                message: format!("must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        errors
    }
}

//! Configuration error and warning types.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

// ============================================================================
// ClampWarning
// ============================================================================

/// An out-of-range setting that was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClampWarning {
    /// Setting name as written in the config file
    pub field: &'static str,
    pub value: i64,
    pub min: u64,
    pub max: u64,
    pub fallback: u64,
}

impl fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{} {} is outside {}..={}, using {}",
            "[".dimmed(),
            self.field.cyan(),
            "]".dimmed(),
            self.value,
            self.min,
            self.max,
            self.fallback
        )
    }
}

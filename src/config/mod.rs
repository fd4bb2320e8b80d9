//! Preview settings loaded from `fenceplay.toml`.
//!
//! The file is a flat record with three optional fields:
//!
//! ```toml
//! debounce_milliseconds = 500     # delay after a change before re-rendering (100-2000)
//! loop_guard_milliseconds = 100   # wall-clock budget per loop (50-1000)
//! update_on_save_only = false     # render only on save, without debounce
//! ```
//!
//! Missing fields take their defaults. Out-of-range numbers fall back to
//! the default with a warning; they never block startup.

pub mod types;

pub use types::{ClampWarning, ConfigError, init_settings, reload_settings, settings};

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::log;

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_LOOP_GUARD_MS: u64 = 100;
pub const DEBOUNCE_RANGE: RangeInclusive<u64> = 100..=2000;
pub const LOOP_GUARD_RANGE: RangeInclusive<u64> = 50..=1000;

// ============================================================================
// settings
// ============================================================================

/// Validated, process-wide preview settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewSettings {
    pub debounce_milliseconds: u64,
    pub loop_guard_milliseconds: u64,
    pub update_on_save_only: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce_milliseconds: DEFAULT_DEBOUNCE_MS,
            loop_guard_milliseconds: DEFAULT_LOOP_GUARD_MS,
            update_on_save_only: false,
        }
    }
}

impl PreviewSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_milliseconds)
    }

    pub fn loop_guard(&self) -> Duration {
        Duration::from_millis(self.loop_guard_milliseconds)
    }

    /// Validate raw values, replacing out-of-range numbers with defaults.
    pub fn from_raw(raw: &RawSettings) -> (Self, Vec<ClampWarning>) {
        let mut warnings = Vec::new();
        let debounce_milliseconds = clamp_or_default(
            "debounce_milliseconds",
            raw.debounce_milliseconds,
            DEBOUNCE_RANGE,
            DEFAULT_DEBOUNCE_MS,
            &mut warnings,
        );
        let loop_guard_milliseconds = clamp_or_default(
            "loop_guard_milliseconds",
            raw.loop_guard_milliseconds,
            LOOP_GUARD_RANGE,
            DEFAULT_LOOP_GUARD_MS,
            &mut warnings,
        );

        let settings = Self {
            debounce_milliseconds,
            loop_guard_milliseconds,
            update_on_save_only: raw.update_on_save_only.unwrap_or(false),
        };
        (settings, warnings)
    }
}

fn clamp_or_default(
    field: &'static str,
    value: Option<i64>,
    range: RangeInclusive<u64>,
    fallback: u64,
    warnings: &mut Vec<ClampWarning>,
) -> u64 {
    let Some(value) = value else {
        return fallback;
    };
    match u64::try_from(value) {
        Ok(v) if range.contains(&v) => v,
        _ => {
            warnings.push(ClampWarning {
                field,
                value,
                min: *range.start(),
                max: *range.end(),
                fallback,
            });
            fallback
        }
    }
}

// ============================================================================
// raw (persisted) form
// ============================================================================

/// Settings exactly as persisted (or passed on the command line).
///
/// Numbers are signed so negative values can be reported instead of
/// failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub debounce_milliseconds: Option<i64>,
    pub loop_guard_milliseconds: Option<i64>,
    pub update_on_save_only: Option<bool>,
}

impl RawSettings {
    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let raw = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((raw, ignored))
    }

    /// Read the settings file; a missing file yields all-default settings.
    pub fn from_path(path: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        if !path.exists() {
            return Ok((Self::default(), Vec::new()));
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse_with_ignored(&content)
    }

    /// Values in `overrides` win over values in `self`.
    pub fn merge(self, overrides: &RawSettings) -> Self {
        Self {
            debounce_milliseconds: overrides.debounce_milliseconds.or(self.debounce_milliseconds),
            loop_guard_milliseconds: overrides
                .loop_guard_milliseconds
                .or(self.loop_guard_milliseconds),
            update_on_save_only: overrides.update_on_save_only.or(self.update_on_save_only),
        }
    }
}

/// Load, merge CLI overrides and validate, logging every correction.
pub fn load_settings(path: &Path, overrides: &RawSettings) -> Result<PreviewSettings, ConfigError> {
    let (raw, ignored) = RawSettings::from_path(path)?;
    if !ignored.is_empty() {
        print_unknown_fields_warning(&ignored, path);
    }

    let (settings, warnings) = PreviewSettings::from_raw(&raw.merge(overrides));
    for warning in &warnings {
        log!("config"; "{}", warning);
    }
    Ok(settings)
}

/// Print warning about unknown fields.
fn print_unknown_fields_warning(fields: &[String], path: &Path) {
    let display_path = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());
    log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
}

// ============================================================================
// tests
// ============================================================================

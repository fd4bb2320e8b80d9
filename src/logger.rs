//! Logging utilities with colored output and a watch-mode status block.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only printed with `--verbose`
//! - `WatchStatus` for per-cycle preview status messages
//!
//! # Example
//!
//! ```ignore
//! log!("serve"; "http://{}", addr);
//! debug!("preview"; "debounce armed for {:?}", delay);
//! logger::status_success("rendered preview-3.html");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold().to_string(),
        "watch" | "preview" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "warning" | "config" => prefix.yellow().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Preview Status (one block per cycle, overwritten in place)
// ============================================================================

/// Outcome severity of a preview cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Ok,
    Failed,
    Warn,
}

impl Severity {
    fn symbol(self) -> String {
        match self {
            Self::Ok => "✓".green().to_string(),
            Self::Failed => "✗".red().to_string(),
            Self::Warn => "⚠".yellow().to_string(),
        }
    }
}

/// Seconds since midnight UTC as `HH:MM:SS`.
fn clock(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

fn now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    clock(secs)
}

/// Terminal block reporting the latest preview cycle.
///
/// Only the newest report stays on screen; the previous block is cleared
/// before writing.
pub struct WatchStatus {
    /// Height of the block currently on screen.
    shown: usize,
    /// Reports written so far.
    reports: u64,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self { shown: 0, reports: 0 }
    }

    fn report(&mut self, severity: Severity, summary: &str, detail: &str) {
        let body = compose(summary, detail);
        let mut stdout = stdout().lock();

        let height = u16::try_from(self.shown).unwrap_or(u16::MAX);
        if height > 0 {
            execute!(stdout, cursor::MoveUp(height), Clear(ClearType::FromCursorDown)).ok();
        }

        self.reports += 1;
        let stamp = format!("[{} #{}]", now(), self.reports).dimmed().to_string();
        writeln!(stdout, "{stamp} {} {body}", severity.symbol()).ok();
        stdout.flush().ok();

        self.shown = body.lines().count().max(1);
    }
}

/// Summary line followed by an optional detail block.
fn compose(summary: &str, detail: &str) -> String {
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    }
}

pub fn status_success(message: &str) {
    WATCH_STATUS.lock().report(Severity::Ok, message, "");
}

pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().report(Severity::Failed, summary, detail);
}

pub fn status_warning(detail: &str) {
    WATCH_STATUS.lock().report(Severity::Warn, detail, "");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_status_has_nothing_on_screen() {
        let status = WatchStatus::new();
        assert_eq!((status.shown, status.reports), (0, 0));
    }

    #[test]
    fn test_compose_without_detail() {
        assert_eq!(compose("note.md → preview-1.html", ""), "note.md → preview-1.html");
    }

    #[test]
    fn test_compose_diagnostic_spans_lines() {
        let body = compose(
            "note.md: transform failed",
            "Transformation failed: Unexpected token\n  at line 3",
        );
        assert_eq!(body.lines().count(), 3);
    }

    #[test]
    fn test_clock_wraps_at_midnight() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(86_400 + 3_661), "01:01:01");
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}

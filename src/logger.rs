//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `log_verbose!` for lines only shown with `--verbose`
//!
//! # Example
//!
//! ```ignore
//! log!("serve"; "http://{}", addr);
//! log_verbose!("serve"; "GET /blog 200");
//! ```

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    io::{Write, stderr, stdout},
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Whether `log_verbose!` lines are printed.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Send log lines to stderr, keeping stdout for command output.
static TO_STDERR: AtomicBool = AtomicBool::new(false);

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix.
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

/// Like `log!`, but only printed when verbose output is enabled.
#[macro_export]
macro_rules! log_verbose {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log_timestamped($module, &format!($($arg)*))
        }
    }};
}

pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Route all log output to stderr (used by `render`, whose stdout is HTML).
pub fn log_to_stderr(enabled: bool) {
    TO_STDERR.store(enabled, Ordering::Relaxed);
}

pub fn logs_to_stderr() -> bool {
    TO_STDERR.load(Ordering::Relaxed)
}

/// Print `[module] message`, truncating single-line messages to the
/// terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    write_line(&prefix.to_string(), calc_prefix_len(module.len()), message);
}

/// Same as [`log`] with a dimmed local-time stamp in front.
pub fn log_timestamped(module: &str, message: &str) {
    let stamp = format!("[{}]", now());
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    let prefix_len = stamp.len() + 1 + calc_prefix_len(module.len());
    write_line(&format!("{} {prefix}", stamp.dimmed()), prefix_len, message);
}

fn write_line(prefix: &str, prefix_len: usize, message: &str) {
    let width = get_terminal_width() as usize;
    if logs_to_stderr() {
        write_to(&mut stderr().lock(), width, prefix, prefix_len, message);
    } else {
        write_to(&mut stdout().lock(), width, prefix, prefix_len, message);
    }
}

fn write_to(out: &mut impl Write, width: usize, prefix: &str, prefix_len: usize, message: &str) {
    // Multiline messages (e.g. error chains) are printed in full
    let message = if message.contains('\n') {
        message
    } else {
        truncate_str(message, width.saturating_sub(prefix_len))
    };

    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold(),
        "shell" => prefix.bright_green().bold(),
        "content" => prefix.bright_magenta().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    // Find the last valid UTF-8 boundary within max_len
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

// ============================================================================
// Tests
// ============================================================================

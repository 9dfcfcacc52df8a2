//! Shared CLI output helpers for consistent operator-facing text.
//!
//! Human output goes to stdout with colored status symbols. Errors go to
//! stderr. JSON output is one object per line on stdout.

use std::fmt::Display;

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::error::Result;

const RULE_WIDTH: usize = 56;

/// Print a section header and separator.
pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    println!("  {:<14} {value}", label.dimmed());
}

/// Print a successful status line.
pub fn ok(message: &str) {
    println!("  {} {message}", "✓".green());
}

/// Print a warning status line.
pub fn warn(message: &str) {
    println!("  {} {message}", "⚠".yellow());
}

/// Print an error status line.
pub fn error(message: &str) {
    eprintln!("  {} {message}", "×".red());
}

/// Print a single-line note.
pub fn note(message: &str) {
    println!("  {}", message.dimmed());
}

/// Print a value as a single JSON line.
pub fn json_line<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Format a millisecond value for display.
pub fn millis(value: impl Display) -> String {
    format!("{value} ms")
}

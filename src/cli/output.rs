//! Table and JSON output for CLI commands.

use anyhow::{Context, Result};
use dialoguer::Confirm;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Where command results go. Results are written to stdout; progress and
/// summaries go to stderr so `--json` output stays parseable.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Output {
    pub fn new(json: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        };
        Self { format, quiet }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("failed to encode JSON output")?;
        println!("{json}");
        Ok(())
    }

    pub fn table<T: Tabled>(&self, rows: &[T], empty_message: &str) {
        if rows.is_empty() {
            println!("{empty_message}");
        } else {
            println!("{}", Table::new(rows));
        }
    }

    /// Aligned `label: value` lines for a single record.
    pub fn fields(&self, fields: &[(&str, String)]) {
        let width = fields
            .iter()
            .map(|(label, _)| label.len() + 1)
            .max()
            .unwrap_or(0);
        for (label, value) in fields {
            println!("{:<width$} {}", format!("{label}:"), value);
        }
    }

    /// Confirmation message on stdout, suppressed by `--quiet`.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    /// Progress and summary lines on stderr, suppressed by `--quiet`.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Asks before a destructive action. Quiet mode never prompts and
    /// treats the answer as no.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.quiet {
            return Ok(false);
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("failed to read confirmation")
    }
}

/// Shortens `value` to at most `max` characters, marking the cut with `...`.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn optional_id(value: Option<i64>) -> String {
    value.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

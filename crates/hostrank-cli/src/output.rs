//! Summary rendering for `batch`, `analyze` and `config show`.
//!
//! Attribute tables are CSV files and never pass through here; this module
//! only formats the run summary. The mode comes from `--format` (or the
//! hidden `--json`), then the `FORMAT` environment variable, then whether
//! stdout is a terminal.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

/// How run summaries are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Aligned report for a terminal.
    Pretty,
    /// One tab-separated line per file.
    Text,
    /// The summary structure as JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn choose(flag: Option<Self>, json: bool, env: Option<&str>, tty: bool) -> Self {
        flag.or_else(|| json.then_some(Self::Json))
            .or_else(|| env.and_then(|v| <Self as ValueEnum>::from_str(v, true).ok()))
            .unwrap_or(if tty { Self::Pretty } else { Self::Text })
    }
}

/// Resolve the summary mode for this process.
pub fn resolve_output_mode(flag: Option<OutputMode>, json: bool) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    OutputMode::choose(flag, json, env.as_deref(), io::stdout().is_terminal())
}

/// Print `value` to stdout as JSON, or through the matching writer.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(value, &mut out)?,
        OutputMode::Pretty => pretty(value, &mut out)?,
    }
    Ok(())
}

/// Title underlined to its own width.
pub fn heading(w: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(w, "{title}\n{}", "=".repeat(title.chars().count()))
}

/// `name: value` with names padded so values line up.
pub fn field(w: &mut dyn Write, name: &str, value: impl Display) -> io::Result<()> {
    writeln!(w, "{name:>8}: {value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_json_alias_and_env() {
        let mode = OutputMode::choose(Some(OutputMode::Text), true, Some("json"), true);
        assert_eq!(mode, OutputMode::Text);
        assert_eq!(OutputMode::choose(None, true, Some("pretty"), true), OutputMode::Json);
    }

    #[test]
    fn env_value_ignores_case_and_unknown_values() {
        assert_eq!(OutputMode::choose(None, false, Some("JSON"), true), OutputMode::Json);
        assert_eq!(OutputMode::choose(None, false, Some("csv"), true), OutputMode::Pretty);
        assert_eq!(OutputMode::choose(None, false, None, false), OutputMode::Text);
    }

    #[test]
    fn summary_fields_line_up() {
        let mut buf = Vec::new();
        heading(&mut buf, "Batch").expect("write");
        field(&mut buf, "files", 12).expect("write");
        field(&mut buf, "failed", 0).expect("write");
        assert_eq!(
            String::from_utf8(buf).expect("utf8"),
            "Batch\n=====\n   files: 12\n  failed: 0\n"
        );
    }
}

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

use super::InputArgs;
use super::batch::render_summary;
use crate::batch::{FileSettings, analyze_file, run_batch};
use crate::config::RunConfig;
use crate::export::write_table;
use crate::output::OutputMode;

/// Arguments for `hostrank analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Flow capture files to analyze.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Write attribute files here instead of beside each capture.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the attribute CSV to stdout instead of writing a file.
    #[arg(long, conflicts_with = "output_dir")]
    pub stdout: bool,

    #[command(flatten)]
    pub input: InputArgs,
}

/// Analyze explicit files. Returns `true` when at least one file failed.
pub fn run_analyze(args: &AnalyzeArgs, config: &RunConfig, output: OutputMode) -> Result<bool> {
    let mut input = config.input.clone();
    args.input.apply(&mut input);

    let settings = FileSettings {
        input,
        analysis: config.analysis.clone(),
        output_dir: args.output_dir.clone().or_else(|| config.output.dir.clone()),
        suffix: config.output.suffix.clone(),
    };

    if args.stdout {
        let [path] = args.files.as_slice() else {
            bail!("--stdout takes exactly one FILE, got {}", args.files.len());
        };
        let report = analyze_file(path, &settings)?;
        for failure in &report.failures {
            tracing::warn!(
                measure = %failure.measure,
                code = failure.error.code(),
                "{}",
                failure.error
            );
        }
        write_table(std::io::stdout().lock(), &report.table)?;
        return Ok(false);
    }

    let summary = run_batch(&args.files, &settings, 1)?;
    render_summary(&summary, output)?;
    Ok(summary.has_failures())
}

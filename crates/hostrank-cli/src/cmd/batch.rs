use anyhow::{Result, anyhow};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use super::InputArgs;
use crate::batch::{BatchSummary, FileOutcome, FileSettings, run_batch};
use crate::config::RunConfig;
use crate::output::{OutputMode, field, heading, render_mode};
use crate::walk::DatasetWalker;

/// Arguments for `hostrank batch`.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Dataset root to walk (defaults to `dataset.root` from the config).
    #[arg(value_name = "DATASET_DIR")]
    pub dataset: Option<PathBuf>,

    /// Only analyze files inside directories with this name (e.g. `5`).
    #[arg(long, value_name = "NAME")]
    pub subdir: Option<String>,

    /// Capture file extension.
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Files analyzed in parallel.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Write attribute files here instead of beside each capture.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub input: InputArgs,
}

/// Walk the dataset and analyze every capture. Returns `true` when at least
/// one file failed.
pub fn run_batch_cmd(args: &BatchArgs, config: &RunConfig, output: OutputMode) -> Result<bool> {
    let root = args
        .dataset
        .clone()
        .or_else(|| config.dataset.root.clone())
        .ok_or_else(|| anyhow!("no dataset directory: pass DATASET_DIR or set dataset.root"))?;
    let subdir = args.subdir.clone().or_else(|| config.dataset.subdir.clone());
    let extension = args
        .extension
        .clone()
        .unwrap_or_else(|| config.dataset.extension.clone());
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);

    let mut input = config.input.clone();
    args.input.apply(&mut input);
    // Fail fast on a bad delimiter instead of once per file.
    input.delimiter_byte()?;

    let files = DatasetWalker::new(&root, subdir, extension).collect()?;
    if files.is_empty() {
        warn!(root = %root.display(), "no matching capture files");
    }
    info!(root = %root.display(), files = files.len(), jobs, "batch started");

    let settings = FileSettings {
        input,
        analysis: config.analysis.clone(),
        output_dir: args.output_dir.clone().or_else(|| config.output.dir.clone()),
        suffix: config.output.suffix.clone(),
    };
    let summary = run_batch(&files, &settings, jobs)?;
    render_summary(&summary, output)?;
    Ok(summary.has_failures())
}

/// Print a per-file summary in the requested mode.
pub fn render_summary(summary: &BatchSummary, output: OutputMode) -> Result<()> {
    render_mode(output, summary, render_text, render_pretty)
}

fn render_text(summary: &BatchSummary, w: &mut dyn Write) -> io::Result<()> {
    for file in &summary.files {
        match file {
            FileOutcome::Written {
                path,
                output,
                hosts,
                missing_measures,
                ..
            } => writeln!(
                w,
                "written\t{}\t{}\t{hosts}\t{}",
                path.display(),
                output.display(),
                missing_measures.len()
            )?,
            FileOutcome::Failed { path, error, .. } => {
                writeln!(w, "failed\t{}\t{error}", path.display())?;
            }
        }
    }
    Ok(())
}

fn render_pretty(summary: &BatchSummary, w: &mut dyn Write) -> io::Result<()> {
    heading(w, "Batch summary")?;
    field(w, "files", summary.files.len())?;
    field(w, "written", summary.written)?;
    field(w, "failed", summary.failed)?;
    if summary.files.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    for file in &summary.files {
        match file {
            FileOutcome::Written {
                path,
                output,
                hosts,
                missing_measures,
                ..
            } => {
                writeln!(w, "  ok    {} -> {} ({hosts} hosts)", path.display(), output.display())?;
                for note in missing_measures {
                    writeln!(w, "        {} empty: {} [{}]", note.measure, note.message, note.code)?;
                }
            }
            FileOutcome::Failed { path, error, .. } => {
                writeln!(w, "  FAIL  {}: {error}", path.display())?;
            }
        }
    }
    Ok(())
}

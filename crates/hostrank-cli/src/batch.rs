//! Per-file analysis and the parallel batch driver.
//!
//! Each capture is read, analyzed and exported independently. A failure in
//! one file becomes a [`FileOutcome::Failed`] and never stops the others.

use anyhow::{Context, Result};
use hostrank_core::{AnalysisConfig, AnalysisError, CentralityReport, Measure, analyze_flows};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::InputConfig;
use crate::export::{attribute_path, write_table_file};
use crate::ingest::read_flows;

/// Everything needed to turn one capture into one attribute file.
#[derive(Debug, Clone)]
pub struct FileSettings {
    pub input: InputConfig,
    pub analysis: AnalysisConfig,
    pub output_dir: Option<PathBuf>,
    pub suffix: String,
}

/// A measure that was left empty in an otherwise written file.
#[derive(Debug, Clone, Serialize)]
pub struct MeasureNote {
    pub measure: Measure,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Written {
        path: PathBuf,
        output: PathBuf,
        hosts: usize,
        flows: usize,
        missing_measures: Vec<MeasureNote>,
    },
    Failed {
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<&'static str>,
        error: String,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::Failed { path, .. } => path,
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub files: Vec<FileOutcome>,
    pub written: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn from_outcomes(files: Vec<FileOutcome>) -> Self {
        let failed = files.iter().filter(|f| f.is_failed()).count();
        Self {
            written: files.len() - failed,
            failed,
            files,
        }
    }

    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Read and analyze one capture without writing anything.
pub fn analyze_file(path: &Path, settings: &FileSettings) -> Result<CentralityReport> {
    let flows = read_flows(path, &settings.input)?;
    analyze_flows(&flows, &settings.analysis)
        .with_context(|| format!("Failed to analyze {}", path.display()))
}

/// Analyze one capture and write its attribute file.
pub fn process_file(path: &Path, settings: &FileSettings) -> FileOutcome {
    match try_process_file(path, settings) {
        Ok(outcome) => outcome,
        Err(error) => {
            let code = error
                .chain()
                .find_map(|cause| cause.downcast_ref::<AnalysisError>())
                .map(AnalysisError::code);
            warn!(path = %path.display(), code, "{error:#}");
            FileOutcome::Failed {
                path: path.to_path_buf(),
                code,
                error: format!("{error:#}"),
            }
        }
    }
}

fn try_process_file(path: &Path, settings: &FileSettings) -> Result<FileOutcome> {
    let report = analyze_file(path, settings)?;
    let output = attribute_path(path, settings.output_dir.as_deref(), &settings.suffix);
    write_table_file(&output, &report.table)?;

    let missing_measures: Vec<MeasureNote> = report
        .failures
        .iter()
        .map(|f| MeasureNote {
            measure: f.measure,
            code: f.error.code(),
            message: f.error.to_string(),
        })
        .collect();
    for note in &missing_measures {
        warn!(path = %path.display(), measure = %note.measure, code = note.code, "{}", note.message);
    }
    info!(
        path = %path.display(),
        output = %output.display(),
        hosts = report.table.len(),
        "attributes written"
    );

    Ok(FileOutcome::Written {
        path: path.to_path_buf(),
        output,
        hosts: report.table.len(),
        flows: report.summary.flow_count,
        missing_measures,
    })
}

/// Process every file, `jobs` at a time. Outcomes keep the input order.
pub fn run_batch(paths: &[PathBuf], settings: &FileSettings, jobs: usize) -> Result<BatchSummary> {
    let outcomes: Vec<FileOutcome> = if jobs <= 1 {
        paths.iter().map(|p| process_file(p, settings)).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("Failed to start worker pool")?;
        pool.install(|| paths.par_iter().map(|p| process_file(p, settings)).collect())
    };
    Ok(BatchSummary::from_outcomes(outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings() -> FileSettings {
        FileSettings {
            input: InputConfig::default(),
            analysis: AnalysisConfig::default(),
            output_dir: None,
            suffix: "_attributes.csv".into(),
        }
    }

    #[test]
    fn good_and_bad_files_both_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("good.binetflow");
        let bad = dir.path().join("bad.binetflow");
        fs::write(&good, "SrcAddr,DstAddr\nA,B\nB,C\nC,A\n").expect("write");
        fs::write(&bad, "SrcAddr,DstAddr\nA,B\n,C\n").expect("write");

        let summary = run_batch(&[bad.clone(), good.clone()], &settings(), 2).expect("batch");
        assert_eq!(summary.written, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert_eq!(summary.files[0].path(), bad.as_path());

        match &summary.files[0] {
            FileOutcome::Failed { code, error, .. } => {
                assert_eq!(*code, Some("E1101"));
                assert!(error.contains("record #1"), "{error}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(dir.path().join("good.binetflow_attributes.csv").exists());
        assert!(!dir.path().join("bad.binetflow_attributes.csv").exists());
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("x.binetflow");
        fs::write(&input, "SrcAddr,DstAddr\nA,B\n").expect("write");
        let out = dir.path().join("out/nested");
        let settings = FileSettings {
            output_dir: Some(out.clone()),
            ..settings()
        };
        let outcome = process_file(&input, &settings);
        assert!(!outcome.is_failed());
        assert!(out.join("x.binetflow_attributes.csv").exists());
    }

    #[test]
    fn measure_failure_still_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("loop.binetflow");
        fs::write(&input, "SrcAddr,DstAddr\nA,B\nA,B\nB,A\nB,A\n").expect("write");
        let mut settings = settings();
        settings.analysis.alpha.alpha = 0.5;

        match process_file(&input, &settings) {
            FileOutcome::Written {
                missing_measures, ..
            } => {
                assert_eq!(missing_measures.len(), 1);
                assert_eq!(missing_measures[0].measure, Measure::AlphaCentrality);
                assert_eq!(missing_measures[0].code, "E2102");
            }
            other => panic!("expected written, got {other:?}"),
        }
    }
}

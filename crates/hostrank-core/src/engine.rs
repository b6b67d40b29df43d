//! Centrality engine: runs every enabled measure over one [`HostGraph`].
//!
//! Measures are independent. A measure that fails (non-convergence, a
//! singular alpha system, non-finite output) is recorded as a
//! [`MeasureFailure`] and leaves its column empty; the rest of the table is
//! still produced.

use tracing::{debug, instrument};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::graph::build::HostGraph;
use crate::graph::stats::GraphSummary;
use crate::metrics::Measure;
use crate::metrics::alpha::solve_alpha_centrality;
use crate::metrics::closeness::closeness_centrality;
use crate::metrics::degree::degree_centrality;
use crate::metrics::eigenvector::eigenvector_centrality;
use crate::metrics::ensure_finite;
use crate::metrics::pagerank::pagerank;
use crate::table::{CentralityResultTable, HostScores};

/// A measure that could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureFailure {
    pub measure: Measure,
    pub error: AnalysisError,
}

/// Output of one analysis run.
#[derive(Debug, Clone)]
pub struct CentralityReport {
    pub table: CentralityResultTable,
    pub failures: Vec<MeasureFailure>,
    pub summary: GraphSummary,
}

impl CentralityReport {
    /// `true` when every enabled measure produced scores.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failure(&self, measure: Measure) -> Option<&AnalysisError> {
        self.failures
            .iter()
            .find(|f| f.measure == measure)
            .map(|f| &f.error)
    }
}

/// Runs the configured measures. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct CentralityEngine {
    config: AnalysisConfig,
}

impl CentralityEngine {
    #[must_use]
    pub const fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Compute every enabled measure for `hg`.
    ///
    /// Never fails as a whole: per-measure errors land in
    /// [`CentralityReport::failures`].
    #[instrument(skip(self, hg), fields(nodes = hg.node_count(), edges = hg.edge_count()))]
    pub fn analyze(&self, hg: &HostGraph) -> CentralityReport {
        let config = &self.config;
        let mut failures = Vec::new();

        // Degree is integral and always present.
        let degree = degree_centrality(hg, &config.degree);

        let closeness = self.run(Measure::Closeness, &mut failures, || {
            Ok(closeness_centrality(hg, &config.closeness))
        });
        let eigenvector = self.run(Measure::Eigenvector, &mut failures, || {
            eigenvector_centrality(hg, &config.eigenvector)
        });
        let pagerank = self.run(Measure::PageRank, &mut failures, || {
            pagerank(hg, &config.pagerank)
        });
        let alpha = self.run(Measure::AlphaCentrality, &mut failures, || {
            solve_alpha_centrality(hg, &config.alpha)
        });

        let pick = |column: &Option<Vec<f64>>, i: usize| column.as_ref().map(|v| v[i]);
        let rows = hg
            .hosts()
            .enumerate()
            .map(|(i, host)| HostScores {
                host: host.to_string(),
                degree: degree.total_degree[i],
                in_degree: degree.in_degree[i],
                out_degree: degree.out_degree[i],
                closeness: pick(&closeness, i),
                eigenvector: pick(&eigenvector, i),
                pagerank: pick(&pagerank, i),
                alpha_centrality: pick(&alpha, i),
            })
            .collect();

        debug!(failed = failures.len(), "analysis finished");
        CentralityReport {
            table: CentralityResultTable::from_rows(rows),
            failures,
            summary: GraphSummary::from_graph(hg),
        }
    }

    fn run<F>(
        &self,
        measure: Measure,
        failures: &mut Vec<MeasureFailure>,
        compute: F,
    ) -> Option<Vec<f64>>
    where
        F: FnOnce() -> Result<Vec<f64>, AnalysisError>,
    {
        if !self.config.is_enabled(measure) {
            return None;
        }
        match compute().and_then(|scores| ensure_finite(measure, scores)) {
            Ok(scores) => Some(scores),
            Err(error) => {
                debug!(%measure, code = error.code(), %error, "measure failed");
                failures.push(MeasureFailure { measure, error });
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! One-call entry point: flow records in, centrality report out.

use tracing::instrument;

use crate::config::AnalysisConfig;
use crate::engine::{CentralityEngine, CentralityReport};
use crate::error::AnalysisError;
use crate::flow::FlowRecord;
use crate::graph::build::build_graph;

/// Validate `config`, build the host graph from `records`, and run every
/// enabled measure.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] for out-of-range parameters and
/// [`AnalysisError::MalformedInput`] for a record with an empty host. Measure
/// failures do not error here; they are listed in
/// [`CentralityReport::failures`].
#[instrument(skip_all, fields(records = records.len()))]
pub fn analyze_flows(
    records: &[FlowRecord],
    config: &AnalysisConfig,
) -> Result<CentralityReport, AnalysisError> {
    config.validate()?;
    let graph = build_graph(records, &config.graph)?;
    Ok(CentralityEngine::new(config.clone()).analyze(&graph))
}

//! Analysis configuration shared by the engine and its callers.
//!
//! Every field has a serde default so a partial `[analysis]` table in a
//! TOML file (or none at all) yields a complete configuration.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::graph::build::GraphBuildOptions;
use crate::metrics::Measure;
use crate::metrics::alpha::AlphaConfig;
use crate::metrics::closeness::ClosenessConfig;
use crate::metrics::degree::DegreeConfig;
use crate::metrics::eigenvector::EigenvectorConfig;
use crate::metrics::pagerank::PageRankConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Measures to compute. Degree columns are always filled.
    #[serde(default = "default_measures")]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub graph: GraphBuildOptions,
    #[serde(default)]
    pub degree: DegreeConfig,
    #[serde(default)]
    pub closeness: ClosenessConfig,
    #[serde(default)]
    pub eigenvector: EigenvectorConfig,
    #[serde(default)]
    pub pagerank: PageRankConfig,
    #[serde(default)]
    pub alpha: AlphaConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            measures: default_measures(),
            graph: GraphBuildOptions::default(),
            degree: DegreeConfig::default(),
            closeness: ClosenessConfig::default(),
            eigenvector: EigenvectorConfig::default(),
            pagerank: PageRankConfig::default(),
            alpha: AlphaConfig::default(),
        }
    }
}

fn default_measures() -> Vec<Measure> {
    Measure::ALL.to_vec()
}

impl AnalysisConfig {
    /// Returns `true` when `measure` should be computed.
    #[must_use]
    pub fn is_enabled(&self, measure: Measure) -> bool {
        measure == Measure::Degree || self.measures.contains(&measure)
    }

    /// Reject out-of-range parameters before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] describing the first bad
    /// parameter.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let pr = &self.pagerank;
        if !(pr.damping > 0.0 && pr.damping < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "pagerank damping must lie in (0, 1), got {}",
                pr.damping
            )));
        }
        if !(pr.tolerance > 0.0) || pr.max_iter == 0 {
            return Err(AnalysisError::InvalidConfig(
                "pagerank needs a positive tolerance and max_iter".to_string(),
            ));
        }

        let ev = &self.eigenvector;
        if !(ev.tolerance > 0.0) || ev.max_iter == 0 {
            return Err(AnalysisError::InvalidConfig(
                "eigenvector needs a positive tolerance and max_iter".to_string(),
            ));
        }

        self.alpha.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::SelfLoopPolicy;
    use crate::metrics::alpha::ExogenousDegree;
    use crate::metrics::closeness::ClosenessDirection;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.pagerank.damping - 0.85).abs() < f64::EPSILON);
        assert!((config.alpha.alpha - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.measures.len(), 5);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "graph": { "self_loops": "drop" },
            "closeness": { "direction": "all" },
            "alpha": { "alpha": 0.05, "exogenous": "total_degree" },
            "measures": ["pagerank", "alpha_centrality"]
        }"#;
        let config: AnalysisConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.graph.self_loops, SelfLoopPolicy::Drop);
        assert_eq!(config.closeness.direction, ClosenessDirection::All);
        assert_eq!(config.alpha.exogenous, ExogenousDegree::TotalDegree);
        assert_eq!(config.alpha.dense_limit, 2048);
        assert!(config.is_enabled(Measure::Degree));
        assert!(!config.is_enabled(Measure::Closeness));
        assert!(config.is_enabled(Measure::PageRank));
    }

    #[test]
    fn damping_out_of_range_rejected() {
        let mut config = AnalysisConfig::default();
        config.pagerank.damping = 1.0;
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn zero_iteration_cap_rejected() {
        let mut config = AnalysisConfig::default();
        config.eigenvector.max_iter = 0;
        assert!(config.validate().is_err());
    }
}

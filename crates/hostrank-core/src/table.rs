//! Per-host result table.
//!
//! One row per vertex, in vertex insertion order, keyed by host identifier.
//! Degree columns are always present; every other measure is `None` when it
//! was disabled or failed.

use std::collections::HashMap;

use serde::Serialize;

/// Scores for a single host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostScores {
    pub host: String,
    pub degree: f64,
    pub in_degree: f64,
    pub out_degree: f64,
    pub closeness: Option<f64>,
    pub eigenvector: Option<f64>,
    pub pagerank: Option<f64>,
    pub alpha_centrality: Option<f64>,
}

impl HostScores {
    /// Numeric values in [`CentralityResultTable::COLUMNS`] order (after `host`).
    #[must_use]
    pub const fn values(&self) -> [Option<f64>; 7] {
        [
            Some(self.degree),
            Some(self.in_degree),
            Some(self.out_degree),
            self.closeness,
            self.eigenvector,
            self.pagerank,
            self.alpha_centrality,
        ]
    }
}

/// Ordered mapping from host to [`HostScores`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CentralityResultTable {
    rows: Vec<HostScores>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CentralityResultTable {
    /// Export column order.
    pub const COLUMNS: [&'static str; 8] = [
        "host",
        "degree",
        "in_degree",
        "out_degree",
        "closeness",
        "eigenvector",
        "pagerank",
        "alpha_centrality",
    ];

    /// Build from rows already in vertex order.
    #[must_use]
    pub fn from_rows(rows: Vec<HostScores>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.host.clone(), i))
            .collect();
        Self { rows, index }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in vertex insertion order.
    #[must_use]
    pub fn rows(&self) -> &[HostScores] {
        &self.rows
    }

    /// Look up a host's row.
    #[must_use]
    pub fn get(&self, host: &str) -> Option<&HostScores> {
        self.index.get(host).map(|&i| &self.rows[i])
    }

    /// Hosts sorted by a score, highest first. Rows without the score are
    /// skipped.
    #[must_use]
    pub fn top_by<F>(&self, score: F, limit: usize) -> Vec<&HostScores>
    where
        F: Fn(&HostScores) -> Option<f64>,
    {
        let mut ranked: Vec<(&HostScores, f64)> = self
            .rows
            .iter()
            .filter_map(|row| score(row).map(|s| (row, s)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.host.cmp(&b.0.host)));
        ranked.into_iter().take(limit).map(|(row, _)| row).collect()
    }
}

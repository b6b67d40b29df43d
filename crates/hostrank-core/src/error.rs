//! Error taxonomy for graph construction and centrality analysis.
//!
//! Errors fall into two scopes:
//!
//! - **Input scope** ([`AnalysisError::MalformedInput`],
//!   [`AnalysisError::InvalidConfig`]): the whole input is rejected before
//!   any measure runs.
//! - **Measure scope** ([`AnalysisError::Convergence`],
//!   [`AnalysisError::SingularSystem`], [`AnalysisError::Computation`]):
//!   only the failing measure is omitted; the engine records the error in
//!   [`crate::engine::CentralityReport::failures`] and keeps going.

use crate::metrics::Measure;

/// Which column of a flow record was missing or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowField {
    Source,
    Destination,
}

impl FlowField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source_host",
            Self::Destination => "dest_host",
        }
    }
}

impl std::fmt::Display for FlowField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised while building the host graph or computing a measure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A flow record has an empty source or destination identifier.
    #[error("malformed flow record #{record}: missing {field}")]
    MalformedInput {
        /// Zero-based position of the record in the input sequence.
        record: usize,
        field: FlowField,
    },

    /// An iterative measure did not reach its tolerance within the cap.
    #[error("{measure} did not converge within {iterations} iterations")]
    Convergence { measure: Measure, iterations: usize },

    /// `(I - alpha*A)` could not be solved at the requested alpha.
    #[error("alpha-centrality system is singular at alpha={alpha} for {vertices} vertices: {reason}")]
    SingularSystem {
        alpha: f64,
        vertices: usize,
        reason: String,
    },

    /// Analysis parameters are out of range.
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected numerical failure inside a measure.
    #[error("{measure} failed: {reason}")]
    Computation { measure: Measure, reason: String },
}

impl AnalysisError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "E1101",
            Self::InvalidConfig(_) => "E1102",
            Self::Convergence { .. } => "E2101",
            Self::SingularSystem { .. } => "E2102",
            Self::Computation { .. } => "E9101",
        }
    }

    /// Returns `true` when the error only invalidates a single measure.
    #[must_use]
    pub const fn is_measure_local(&self) -> bool {
        matches!(
            self,
            Self::Convergence { .. } | Self::SingularSystem { .. } | Self::Computation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let all = [
            AnalysisError::MalformedInput {
                record: 0,
                field: FlowField::Source,
            },
            AnalysisError::InvalidConfig(String::new()),
            AnalysisError::Convergence {
                measure: Measure::Eigenvector,
                iterations: 1,
            },
            AnalysisError::SingularSystem {
                alpha: 0.1,
                vertices: 2,
                reason: String::new(),
            },
            AnalysisError::Computation {
                measure: Measure::PageRank,
                reason: String::new(),
            },
        ];
        let codes: HashSet<_> = all.iter().map(AnalysisError::code).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn malformed_input_names_record_and_field() {
        let err = AnalysisError::MalformedInput {
            record: 7,
            field: FlowField::Destination,
        };
        assert_eq!(err.to_string(), "malformed flow record #7: missing dest_host");
        assert!(!err.is_measure_local());
    }

    #[test]
    fn singular_system_mentions_alpha_and_size() {
        let err = AnalysisError::SingularSystem {
            alpha: 0.5,
            vertices: 2,
            reason: "zero pivot".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("alpha=0.5"));
        assert!(msg.contains("2 vertices"));
        assert!(err.is_measure_local());
    }
}

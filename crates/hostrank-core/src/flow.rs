//! Flow records: the only input the core accepts.

use serde::{Deserialize, Serialize};

/// One observed flow between two hosts.
///
/// Identifiers are opaque strings (usually IPv4/IPv6 addresses). An empty or
/// whitespace-only identifier is treated as a missing field and rejected by
/// [`crate::graph::build_graph`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source_host: String,
    pub dest_host: String,
}

impl FlowRecord {
    pub fn new(source_host: impl Into<String>, dest_host: impl Into<String>) -> Self {
        Self {
            source_host: source_host.into(),
            dest_host: dest_host.into(),
        }
    }

    /// `true` when source and destination are the same host.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source_host == self.dest_host
    }
}

impl<S: Into<String>, D: Into<String>> From<(S, D)> for FlowRecord {
    fn from((source, dest): (S, D)) -> Self {
        Self::new(source, dest)
    }
}

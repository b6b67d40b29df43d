//! Host-interaction graph module.
//!
//! # Overview
//!
//! Builds the petgraph-based directed host graph that every centrality
//! measure runs on.
//!
//! ## Pipeline
//!
//! ```text
//! &[FlowRecord]
//!        ↓  build::build_graph()
//! HostGraph (DiGraph<String, u32>, weight = flow multiplicity)
//!        ↓  stats::GraphSummary::from_graph()
//! GraphSummary (counts, density, components, cycles, content hash)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use hostrank_core::flow::FlowRecord;
//! use hostrank_core::graph::{GraphBuildOptions, GraphSummary, build_graph};
//!
//! let flows = vec![FlowRecord::new("10.0.0.1", "10.0.0.2")];
//! let graph = build_graph(&flows, &GraphBuildOptions::default()).unwrap();
//! let summary = GraphSummary::from_graph(&graph);
//! assert_eq!(summary.node_count, 2);
//! ```

pub mod build;
pub mod stats;

pub use build::{GraphBuildOptions, HostGraph, SelfLoopPolicy, build_graph};
pub use stats::GraphSummary;

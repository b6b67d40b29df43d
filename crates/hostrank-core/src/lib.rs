#![forbid(unsafe_code)]
//! hostrank-core library.
//!
//! Builds a directed host-interaction graph from network flow records and
//! scores every host with degree, closeness, eigenvector, PageRank and alpha
//! centrality.
//!
//! # Conventions
//!
//! - **Errors**: Fallible operations return [`error::AnalysisError`].
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`) and
//!   `#[instrument]` spans. The library never writes to stdout or stderr.
//!
//! # Example
//!
//! ```rust
//! use hostrank_core::{AnalysisConfig, FlowRecord, analyze_flows};
//!
//! let flows = vec![
//!     FlowRecord::new("A", "B"),
//!     FlowRecord::new("B", "C"),
//!     FlowRecord::new("C", "A"),
//! ];
//! let report = analyze_flows(&flows, &AnalysisConfig::default()).unwrap();
//! let a = report.table.get("A").unwrap();
//! assert!((a.alpha_centrality.unwrap() - 1.0 / 0.9).abs() < 1e-9);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod graph;
pub mod linalg;
pub mod metrics;
pub mod pipeline;
pub mod table;

pub use config::AnalysisConfig;
pub use engine::{CentralityEngine, CentralityReport, MeasureFailure};
pub use error::{AnalysisError, FlowField};
pub use flow::FlowRecord;
pub use graph::{GraphBuildOptions, GraphSummary, HostGraph, SelfLoopPolicy, build_graph};
pub use metrics::Measure;
pub use pipeline::analyze_flows;
pub use table::{CentralityResultTable, HostScores};

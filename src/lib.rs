//! citegraph - patent citation-graph synthesis, layout and metrics.
//!
//! Builds the citation neighborhood of a focal patent, arranges it in 3D
//! with a force-directed simulation, and summarizes its connectivity.
//!
//! ```
//! use citegraph::{compute_metrics, ForceDirectedLayout, PatentGraphSource, SyntheticSource};
//!
//! let graph = SyntheticSource::default().fetch("US10123456")?;
//! let positioned = ForceDirectedLayout::default().layout(&graph, 100)?;
//! let metrics = compute_metrics(&positioned)?;
//! assert_eq!(metrics.centrality_scores.len(), 28);
//! # Ok::<(), citegraph::GraphError>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod metrics;
pub mod source;

pub use config::CitegraphConfig;
pub use error::GraphError;
pub use graph::{Category, Edge, EdgeKind, EdgeMerge, Graph, GraphFilter, GraphView, Node, Position};
pub use layout::{ForceDirectedLayout, LayoutConfig, LayoutMode};
pub use metrics::{compute_metrics, MetricsEngine, NetworkMetrics};
pub use source::{FileSource, GraphSynthesizer, PatentGraphSource, SynthesisOptions, SyntheticSource};

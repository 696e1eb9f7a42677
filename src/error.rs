use thiserror::Error;

/// Errors returned by graph sources, the layout engine and the metrics engine.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A caller-supplied argument is empty or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An edge references a node id that is not part of the graph.
    #[error("graph integrity violation: edge #{edge} references unknown node `{node_id}`")]
    GraphIntegrity { edge: usize, node_id: String },

    /// Two nodes share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// An edge weight is not a finite value in [0, 1].
    #[error("edge #{edge} has weight {weight} outside [0, 1]")]
    InvalidWeight { edge: usize, weight: f64 },

    /// The metadata names a center node that does not exist.
    #[error("center node not found: {0}")]
    MissingCenter(String),

    /// Reading a graph document failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a graph document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

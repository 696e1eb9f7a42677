//! Graph sources - each produces a citation graph around a focal patent.

pub mod file;
pub mod synthetic;

use crate::error::{GraphError, Result};
use crate::graph::Graph;

pub use file::FileSource;
pub use synthetic::{GraphSynthesizer, SynthesisOptions, SyntheticSource};

/// Trait for anything that can supply a citation graph.
///
/// Layout and metrics only see the returned [`Graph`], so they work the
/// same on synthetic data and on externally supplied graphs.
pub trait PatentGraphSource {
    /// Name of this source.
    fn name(&self) -> &'static str;

    /// Build or load the graph centered on `central_patent_id`.
    fn fetch(&self, central_patent_id: &str) -> Result<Graph>;
}

/// Check that a patent id is non-empty and free of whitespace, control
/// characters and path syntax, so it can also name a file. Returns the id
/// without surrounding whitespace.
pub fn validate_patent_id(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(GraphError::InvalidArgument(
            "central patent id must not be empty".to_string(),
        ));
    }
    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\')
        || trimmed.starts_with('.')
    {
        return Err(GraphError::InvalidArgument(format!(
            "malformed central patent id: {:?}",
            id
        )));
    }
    Ok(trimmed)
}

//! Externally supplied graphs stored as JSON documents.

use crate::error::{GraphError, Result};
use crate::graph::{EdgeMerge, Graph};
use crate::source::{validate_patent_id, PatentGraphSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `<directory>/<patent id>.json`.
///
/// The document must be a valid graph whose center node carries the
/// requested patent id.
#[derive(Debug, Clone)]
pub struct FileSource {
    directory: PathBuf,
    edge_merge: EdgeMerge,
}

impl FileSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            edge_merge: EdgeMerge::Keep,
        }
    }

    pub fn with_edge_merge(mut self, edge_merge: EdgeMerge) -> Self {
        self.edge_merge = edge_merge;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, patent_id: &str) -> PathBuf {
        self.directory.join(format!("{}.json", patent_id))
    }
}

impl PatentGraphSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn fetch(&self, central_patent_id: &str) -> Result<Graph> {
        let patent_id = validate_patent_id(central_patent_id)?;
        let path = self.path_for(patent_id);
        debug!(path = %path.display(), "loading graph document");

        let mut graph = Graph::from_json(&fs::read_to_string(&path)?)?;
        graph.validate()?;

        let center = graph.center().ok_or_else(|| {
            GraphError::InvalidArgument(format!("{} does not name a center node", path.display()))
        })?;
        if center.patent_id != patent_id {
            return Err(GraphError::InvalidArgument(format!(
                "{} is centered on {}, not {}",
                path.display(),
                center.patent_id,
                patent_id
            )));
        }

        graph.merge_parallel_edges(self.edge_merge);
        Ok(graph)
    }
}

//! Configuration loading for citegraph.
//!
//! Configuration is loaded from TOML files with environment variable overrides
//! (`CITEGRAPH__SECTION__KEY`, e.g. `CITEGRAPH__LAYOUT__DAMPING=0.9`).

use crate::layout::LayoutConfig;
use crate::source::SynthesisOptions;
use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CitegraphConfig {
    #[serde(default)]
    pub synthesis: SynthesisOptions,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Defaults for a synthesize, lay out, measure run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Fixed generator seed; derived from the patent id when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub exact_paths: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: None,
            exact_paths: false,
        }
    }
}

fn default_iterations() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default)]
    pub save_metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            save_metrics: false,
        }
    }
}

fn default_directory() -> String {
    "output".to_string()
}

impl CitegraphConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CITEGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let citegraph_config: CitegraphConfig = config.try_deserialize()?;
        Ok(citegraph_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeMerge;
    use crate::layout::LayoutMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = CitegraphConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.synthesis, SynthesisOptions::default());
        assert_eq!(cfg.layout, LayoutConfig::default());
        assert_eq!(cfg.run.iterations, 100);
        assert_eq!(cfg.output.directory, "output");
    }

    #[test]
    fn file_overrides_selected_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("citegraph.toml");
        fs::write(
            &path,
            r#"
[synthesis]
citing_count = 4
edge_merge = "merge"

[layout]
damping = 0.9
mode = "velocity"

[run]
iterations = 25
seed = 7
"#,
        )
        .unwrap();

        let cfg = CitegraphConfig::load(&path).unwrap();
        assert_eq!(cfg.synthesis.citing_count, 4);
        assert_eq!(cfg.synthesis.cited_count, 12);
        assert_eq!(cfg.synthesis.edge_merge, EdgeMerge::Merge);
        assert_eq!(cfg.layout.damping, 0.9);
        assert_eq!(cfg.layout.repulsion, 500.0);
        assert_eq!(cfg.layout.mode, LayoutMode::Velocity);
        assert_eq!(cfg.run.iterations, 25);
        assert_eq!(cfg.run.seed, Some(7));
        assert!(!cfg.run.exact_paths);
    }
}

//! citegraph CLI - synthesize, lay out and measure patent citation graphs.

use anyhow::{Context, Result};
use citegraph::config::CitegraphConfig;
use citegraph::source::validate_patent_id;
use citegraph::{
    EdgeKind, FileSource, ForceDirectedLayout, Graph, GraphFilter, LayoutMode, MetricsEngine,
    NetworkMetrics, PatentGraphSource, SyntheticSource,
};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "citegraph")]
#[command(about = "Build, lay out and analyze patent citation graphs")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "citegraph.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Synthesize a graph around a patent, lay it out and compute metrics
    Generate {
        /// Central patent id (e.g. US10123456)
        #[arg(short, long)]
        patent: String,

        /// Seed for generation (derived from the patent id by default)
        #[arg(short = 'S', long)]
        seed: Option<u64>,

        /// Layout iterations
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Number of citing patents
        #[arg(long)]
        citing: Option<usize>,

        /// Number of cited patents
        #[arg(long)]
        cited: Option<usize>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save metrics as JSON
        #[arg(long)]
        save_metrics: bool,

        /// Compute the exact average path length as well
        #[arg(long)]
        exact: bool,
    },

    /// Run the force-directed layout on a graph document
    Layout {
        /// Graph JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Layout iterations
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Damping mode
        #[arg(short, long, value_enum)]
        mode: Option<LayoutModeArg>,

        /// Output file path (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print network metrics for a graph document
    Metrics {
        /// Graph JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Compute the exact average path length as well
        #[arg(long)]
        exact: bool,
    },

    /// Print a filtered view of a graph document
    View {
        /// Graph JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Keep only edges of this type
        #[arg(short, long, value_enum)]
        edge_type: Option<EdgeKindArg>,

        /// Search titles, patent ids and inventors
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Load a stored graph for a patent and summarize it
    Load {
        /// Directory holding <patent id>.json documents
        #[arg(short, long)]
        dir: PathBuf,

        /// Central patent id
        #[arg(short, long)]
        patent: String,
    },
}

#[derive(Clone, ValueEnum, Debug)]
enum LayoutModeArg {
    /// Damp positions toward the origin
    Decay,
    /// Damp per-node velocities
    Velocity,
}

impl LayoutModeArg {
    fn to_mode(&self) -> LayoutMode {
        match self {
            LayoutModeArg::Decay => LayoutMode::Decay,
            LayoutModeArg::Velocity => LayoutMode::Velocity,
        }
    }
}

#[derive(Clone, ValueEnum, Debug)]
enum EdgeKindArg {
    Citation,
    Similarity,
    Inventor,
    Assignee,
}

impl EdgeKindArg {
    fn to_kind(&self) -> EdgeKind {
        match self {
            EdgeKindArg::Citation => EdgeKind::Citation,
            EdgeKindArg::Similarity => EdgeKind::Similarity,
            EdgeKindArg::Inventor => EdgeKind::Inventor,
            EdgeKindArg::Assignee => EdgeKind::Assignee,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("citegraph=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = CitegraphConfig::load(Path::new(&cli.config))?;

    match cli.command {
        Commands::Generate {
            patent,
            seed,
            iterations,
            citing,
            cited,
            output,
            save_metrics,
            exact,
        } => {
            let patent = validate_patent_id(&patent)?.to_string();
            let mut options = config.synthesis.clone();
            if let Some(citing) = citing {
                options.citing_count = citing;
            }
            if let Some(cited) = cited {
                options.cited_count = cited;
            }
            let iterations = iterations.unwrap_or(config.run.iterations);
            let save_metrics = save_metrics || config.output.save_metrics;

            let mut source = SyntheticSource::new(options);
            if let Some(seed) = seed.or(config.run.seed) {
                source = source.with_seed(seed);
            }

            println!("Generating citation graph for {}...", patent);
            let graph = source.fetch(&patent)?;
            println!("  {} nodes, {} edges", graph.node_count(), graph.edge_count());

            let graph = ForceDirectedLayout::new(config.layout.clone()).layout(&graph, iterations)?;
            let metrics = MetricsEngine::new()
                .with_exact_paths(exact || config.run.exact_paths)
                .compute(&graph)?;
            print_metrics(&metrics);

            let output_dir = PathBuf::from(&config.output.directory);
            fs::create_dir_all(&output_dir)?;
            let output_path =
                output.unwrap_or_else(|| output_dir.join(format!("citegraph_{}.json", patent)));
            write_graph(&output_path, &graph)?;

            if save_metrics {
                let metrics_path = output_path.with_extension("metrics.json");
                fs::write(&metrics_path, serde_json::to_string_pretty(&metrics)?)?;
                println!("Saved metrics to {}", metrics_path.display());
            }
        }

        Commands::Layout {
            input,
            iterations,
            mode,
            output,
        } => {
            let graph = read_graph(&input)?;
            let mut layout_config = config.layout.clone();
            if let Some(mode) = mode {
                layout_config.mode = mode.to_mode();
            }
            let iterations = iterations.unwrap_or(config.run.iterations);

            info!(iterations, mode = ?layout_config.mode, "running layout");
            let graph = ForceDirectedLayout::new(layout_config).layout(&graph, iterations)?;
            write_graph(&output.unwrap_or(input), &graph)?;
        }

        Commands::Metrics { input, exact } => {
            let graph = read_graph(&input)?;
            let metrics = MetricsEngine::new()
                .with_exact_paths(exact || config.run.exact_paths)
                .compute(&graph)?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }

        Commands::View {
            input,
            edge_type,
            search,
        } => {
            let graph = read_graph(&input)?;
            let filter = GraphFilter {
                edge_kind: edge_type.map(|k| k.to_kind()),
                query: search,
            };
            let view = graph.filter(&filter);

            println!(
                "Showing {} of {} nodes, {} of {} edges",
                view.nodes.len(),
                graph.node_count(),
                view.edges.len(),
                graph.edge_count()
            );
            for node in &view.nodes {
                println!(
                    "  {:<20} {:<10} {:<24} {}",
                    node.id,
                    node.patent_id,
                    node.category,
                    node.title
                );
            }
            for edge in &view.edges {
                println!(
                    "  {} -> {} ({}, {:.2})",
                    edge.source, edge.target, edge.kind, edge.weight
                );
            }
        }

        Commands::Load { dir, patent } => {
            let source = FileSource::new(dir).with_edge_merge(config.synthesis.edge_merge);
            let graph = source.fetch(&patent)?;
            println!(
                "Loaded {} from {}: {} nodes, {} edges",
                patent,
                source.directory().display(),
                graph.node_count(),
                graph.edge_count()
            );
            for (kind, count) in graph.edge_counts() {
                println!("  {}: {}", kind, count);
            }
        }
    }

    Ok(())
}

fn read_graph(path: &Path) -> Result<Graph> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph from {}", path.display()))?;
    let graph = Graph::from_json(&json)
        .with_context(|| format!("failed to parse graph in {}", path.display()))?;
    Ok(graph)
}

fn write_graph(path: &Path, graph: &Graph) -> Result<()> {
    fs::write(path, graph.to_json()?)
        .with_context(|| format!("failed to write graph to {}", path.display()))?;
    println!("Saved to {}", path.display());
    Ok(())
}

fn print_metrics(metrics: &NetworkMetrics) {
    println!("\nMetrics:");
    for line in metrics_summary(metrics) {
        println!("  {}", line);
    }
}

fn metrics_summary(metrics: &NetworkMetrics) -> Vec<String> {
    let mut lines = vec![
        format!("Density: {:.3}", metrics.network_density),
        format!("Clustering: {:.3}", metrics.clustering_coefficient),
    ];
    // an infinite estimate only means the heuristic does not apply
    if metrics.average_path_length.is_finite() {
        lines.push(format!("Avg path length (est.): {:.3}", metrics.average_path_length));
    } else {
        lines.push("Avg path length (est.): undefined".to_string());
    }
    match metrics.exact_average_path_length {
        Some(exact) if exact.is_finite() => {
            lines.push(format!("Avg path length (exact): {:.3}", exact))
        }
        Some(_) => lines.push("Avg path length (exact): disconnected".to_string()),
        None => {}
    }
    if let Some(hub) = metrics.most_central() {
        lines.push(format!("Most central: {}", hub));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use citegraph::{Edge, Node};

    #[test]
    fn infinite_estimate_on_connected_graph_is_undefined() {
        let nodes = vec![Node::new("a", "US1"), Node::new("b", "US2")];
        let edges = vec![Edge::new("a", "b", 0.5, EdgeKind::Citation)];
        let graph = Graph::new(nodes, edges, 1, None);
        let metrics = MetricsEngine::new()
            .with_exact_paths(true)
            .compute(&graph)
            .unwrap();

        let lines = metrics_summary(&metrics);
        assert!(lines.contains(&"Avg path length (est.): undefined".to_string()));
        assert!(lines.contains(&"Avg path length (exact): 1.000".to_string()));
        assert!(!lines.iter().any(|l| l.contains("disconnected")));
    }

    #[test]
    fn disconnected_exact_value_is_labelled() {
        let nodes = vec![Node::new("a", "US1"), Node::new("b", "US2")];
        let graph = Graph::new(nodes, Vec::new(), 1, None);
        let metrics = MetricsEngine::new()
            .with_exact_paths(true)
            .compute(&graph)
            .unwrap();
        assert!(metrics_summary(&metrics)
            .contains(&"Avg path length (exact): disconnected".to_string()));
    }

    #[test]
    fn path_like_patent_ids_are_rejected() {
        assert!(validate_patent_id("../x").is_err());
        assert!(validate_patent_id("US10123456").is_ok());
    }
}

//! Network metrics for citation graphs.
//!
//! Summarizes a graph's connectivity:
//! - Degree centrality: how many relationships touch each patent
//! - Density: how close the graph is to fully connected
//! - Clustering coefficient: how tightly knit neighborhoods are
//! - Average path length: a small-world estimate, with an optional exact
//!   all-pairs BFS value for comparison
//!
//! All metrics treat the graph as undirected and never modify it.

use crate::error::Result;
use crate::graph::{EdgeKind, Graph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Summary statistics for one graph.
///
/// An average path length of `f64::INFINITY` means the value is undefined
/// for this graph (no edges, a single node, or disconnected). It is written
/// as `null` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    /// Node id to normalized degree centrality (0.0 to 1.0).
    pub centrality_scores: BTreeMap<String, f64>,
    pub network_density: f64,
    pub clustering_coefficient: f64,
    /// Small-world estimate `ln(n) / ln(2e / n)`.
    #[serde(with = "sentinel")]
    pub average_path_length: f64,
    /// Mean shortest-path length over all node pairs, when requested.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_sentinel"
    )]
    pub exact_average_path_length: Option<f64>,
    pub node_count: usize,
    pub edge_count: usize,
    pub edge_counts: BTreeMap<EdgeKind, usize>,
}

impl NetworkMetrics {
    /// Id of the node with the highest centrality, ties broken by id.
    pub fn most_central(&self) -> Option<&str> {
        self.centrality_scores
            .iter()
            .fold(None, |best: Option<(&String, f64)>, (id, &score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((id, score)),
            })
            .map(|(id, _)| id.as_str())
    }
}

/// Computes [`NetworkMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine {
    exact_paths: bool,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also compute the exact average shortest-path length. Costs one BFS
    /// per node.
    pub fn with_exact_paths(mut self, enabled: bool) -> Self {
        self.exact_paths = enabled;
        self
    }

    /// Fails with [`GraphError::GraphIntegrity`](crate::GraphError::GraphIntegrity)
    /// when an edge references a missing node.
    pub fn compute(&self, graph: &Graph) -> Result<NetworkMetrics> {
        let resolved = graph.resolve_edges()?;
        let neighbors = graph.neighbor_sets()?;
        let n = graph.node_count();

        let mut degrees = vec![0usize; n];
        for &(src, tgt) in &resolved {
            degrees[src] += 1;
            degrees[tgt] += 1;
        }
        let max_degree = degrees.iter().copied().max().unwrap_or(0);
        let centrality_scores = graph
            .nodes
            .iter()
            .zip(&degrees)
            .map(|(node, &deg)| {
                let score = if max_degree > 0 {
                    deg as f64 / max_degree as f64
                } else {
                    0.0
                };
                (node.id.clone(), score)
            })
            .collect();

        let network_density = density(n, graph.edge_count());
        let clustering_coefficient = clustering_coefficient(&neighbors);
        let average_path_length = estimate_path_length(n, graph.edge_count());
        let exact_average_path_length = self.exact_paths.then(|| exact_path_length(&neighbors));

        debug!(
            nodes = n,
            edges = graph.edge_count(),
            density = network_density,
            clustering = clustering_coefficient,
            "computed network metrics"
        );

        Ok(NetworkMetrics {
            centrality_scores,
            network_density,
            clustering_coefficient,
            average_path_length,
            exact_average_path_length,
            node_count: n,
            edge_count: graph.edge_count(),
            edge_counts: graph.edge_counts(),
        })
    }
}

/// Compute the standard metrics (no exact path length).
pub fn compute_metrics(graph: &Graph) -> Result<NetworkMetrics> {
    MetricsEngine::default().compute(graph)
}

/// Edges over the number of possible node pairs, capped at 1 so parallel
/// edges cannot push it out of range.
fn density(n: usize, edge_count: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let max_edges = (n * (n - 1) / 2) as f64;
    (edge_count as f64 / max_edges).min(1.0)
}

/// Mean local clustering over nodes with at least two neighbors.
fn clustering_coefficient(neighbors: &[HashSet<usize>]) -> f64 {
    let mut total = 0.0;
    let mut qualifying = 0usize;

    for node_neighbors in neighbors {
        let k = node_neighbors.len();
        if k < 2 {
            continue;
        }

        // Count edges between neighbors
        let neighbor_vec: Vec<usize> = node_neighbors.iter().copied().collect();
        let mut neighbor_edges = 0usize;
        for i in 0..neighbor_vec.len() {
            for j in (i + 1)..neighbor_vec.len() {
                if neighbors[neighbor_vec[i]].contains(&neighbor_vec[j]) {
                    neighbor_edges += 1;
                }
            }
        }

        let max_edges = k * (k - 1) / 2;
        total += neighbor_edges as f64 / max_edges as f64;
        qualifying += 1;
    }

    if qualifying > 0 {
        total / qualifying as f64
    } else {
        0.0
    }
}

/// Small-world estimate `ln(n) / ln(2e / n)`.
///
/// Infinite when there are no edges, at most one node, or the mean degree
/// is at most 1, where the estimate diverges or turns negative.
fn estimate_path_length(n: usize, edge_count: usize) -> f64 {
    if n <= 1 || edge_count == 0 {
        return f64::INFINITY;
    }
    let mean_degree = 2.0 * edge_count as f64 / n as f64;
    if mean_degree <= 1.0 {
        return f64::INFINITY;
    }
    (n as f64).ln() / mean_degree.ln()
}

/// Mean BFS distance over all ordered node pairs; infinite when the graph
/// has fewer than two nodes or is disconnected.
fn exact_path_length(neighbors: &[HashSet<usize>]) -> f64 {
    let n = neighbors.len();
    if n <= 1 {
        return f64::INFINITY;
    }

    let mut total: u64 = 0;
    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();

    for source in 0..n {
        dist.iter_mut().for_each(|d| *d = usize::MAX);
        dist[source] = 0;
        queue.push_back(source);
        let mut reached = 1;

        while let Some(v) = queue.pop_front() {
            for &w in &neighbors[v] {
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    total += dist[w] as u64;
                    reached += 1;
                    queue.push_back(w);
                }
            }
        }

        if reached < n {
            return f64::INFINITY;
        }
    }

    total as f64 / (n * (n - 1)) as f64
}

mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            s.serialize_some(value)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
    }
}

mod optional_sentinel {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::sentinel::serialize(v, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        super::sentinel::deserialize(d).map(Some)
    }
}

//! Citation graph data model.
//!
//! A [`Graph`] holds a focal patent (the center node), the patents around
//! it and the typed, weighted relationships between them. Node and edge
//! sets are fixed once a graph is built; only node positions change when
//! the layout engine runs.

use crate::error::{GraphError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::ops::{AddAssign, SubAssign};

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Displacement from `other` to `self`.
    pub fn minus(&self, other: &Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scaled(&self, factor: f64) -> Position {
        Position::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for Position {
    fn sub_assign(&mut self, rhs: Position) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

/// Technology categories a patent can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Artificial Intelligence")]
    ArtificialIntelligence,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Computer Vision")]
    ComputerVision,
    #[serde(rename = "Signal Processing")]
    SignalProcessing,
    #[serde(rename = "Data Mining")]
    DataMining,
    #[serde(rename = "Robotics")]
    Robotics,
    #[serde(rename = "Neural Networks")]
    NeuralNetworks,
    #[serde(rename = "Pattern Recognition")]
    PatternRecognition,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::ArtificialIntelligence,
        Category::MachineLearning,
        Category::ComputerVision,
        Category::SignalProcessing,
        Category::DataMining,
        Category::Robotics,
        Category::NeuralNetworks,
        Category::PatternRecognition,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::ArtificialIntelligence => "Artificial Intelligence",
            Category::MachineLearning => "Machine Learning",
            Category::ComputerVision => "Computer Vision",
            Category::SignalProcessing => "Signal Processing",
            Category::DataMining => "Data Mining",
            Category::Robotics => "Robotics",
            Category::NeuralNetworks => "Neural Networks",
            Category::PatternRecognition => "Pattern Recognition",
        }
    }

    /// Display color used by the renderer for nodes of this category.
    pub fn color(&self) -> &'static str {
        match self {
            Category::ArtificialIntelligence => "#3b82f6",
            Category::MachineLearning => "#10b981",
            Category::ComputerVision => "#f59e0b",
            Category::SignalProcessing => "#ef4444",
            Category::DataMining => "#8b5cf6",
            Category::Robotics => "#f97316",
            Category::NeuralNetworks => "#ec4899",
            Category::PatternRecognition => "#06b6d4",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Citation,
    Similarity,
    Inventor,
    Assignee,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Citation => "citation",
            EdgeKind::Similarity => "similarity",
            EdgeKind::Inventor => "inventor",
            EdgeKind::Assignee => "assignee",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A patent in the citation neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Graph-internal id, unique within a graph.
    pub id: String,
    /// External patent identifier (e.g. "US10123456").
    pub patent_id: String,
    pub title: String,
    pub inventors: Vec<String>,
    pub filing_date: NaiveDate,
    pub citation_count: u32,
    pub category: Category,
    #[serde(flatten)]
    pub position: Position,
    /// Visual size scalar.
    pub size: f64,
    pub color: String,
}

impl Node {
    /// Create a node with placeholder descriptive fields at the origin.
    pub fn new(id: impl Into<String>, patent_id: impl Into<String>) -> Self {
        let category = Category::ArtificialIntelligence;
        Self {
            id: id.into(),
            patent_id: patent_id.into(),
            title: String::new(),
            inventors: Vec::new(),
            filing_date: NaiveDate::default(),
            citation_count: 0,
            category,
            position: Position::ORIGIN,
            size: 10.0,
            color: category.color().to_string(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the category and the matching color.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self.color = category.color().to_string();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_inventors<I, S>(mut self, inventors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inventors = inventors.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive match on title, patent id or any inventor.
    /// `needle` must already be lower-case.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.patent_id.to_lowercase().contains(needle)
            || self
                .inventors
                .iter()
                .any(|inv| inv.to_lowercase().contains(needle))
    }
}

/// A weighted, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Strength of the relationship in [0, 1].
    pub weight: f64,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        weight: f64,
        kind: EdgeKind,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            kind,
        }
    }

    /// Endpoint ids ordered so that (a, b) and (b, a) compare equal.
    fn unordered_pair(&self) -> (&str, &str) {
        if self.source <= self.target {
            (self.source.as_str(), self.target.as_str())
        } else {
            (self.target.as_str(), self.source.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Declared cluster count.
    pub clusters: usize,
    /// Id of the designated center node.
    pub center_node: Option<String>,
}

/// How parallel edges of the same kind between the same pair are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMerge {
    /// Keep every edge as produced.
    #[default]
    Keep,
    /// Collapse same-kind edges on the same unordered pair into one,
    /// summing their weights (capped at 1.0).
    Merge,
}

/// A citation graph: nodes, edges and summary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: GraphMetadata,
}

impl Graph {
    /// Build a graph and derive its node/edge totals.
    pub fn new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        clusters: usize,
        center_node: Option<String>,
    ) -> Self {
        let metadata = GraphMetadata {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            clusters,
            center_node,
        };
        Self {
            nodes,
            edges,
            metadata,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn center(&self) -> Option<&Node> {
        self.metadata
            .center_node
            .as_deref()
            .and_then(|id| self.node(id))
    }

    /// Positions in node order.
    pub fn positions(&self) -> Vec<Position> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Check the structural invariants: unique node ids, an existing center,
    /// edges that reference existing nodes and finite weights in [0, 1].
    pub fn validate(&self) -> Result<()> {
        self.resolve_edges().map(|_| ())
    }

    /// Validate the graph and map every edge to its (source, target) node
    /// indices.
    pub fn resolve_edges(&self) -> Result<Vec<(usize, usize)>> {
        let index = self.node_index()?;

        if let Some(center) = &self.metadata.center_node {
            if !index.contains_key(center.as_str()) {
                return Err(GraphError::MissingCenter(center.clone()));
            }
        }

        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| {
                if !(edge.weight.is_finite() && (0.0..=1.0).contains(&edge.weight)) {
                    return Err(GraphError::InvalidWeight {
                        edge: i,
                        weight: edge.weight,
                    });
                }
                let lookup = |id: &str| {
                    index
                        .get(id)
                        .copied()
                        .ok_or_else(|| GraphError::GraphIntegrity {
                            edge: i,
                            node_id: id.to_string(),
                        })
                };
                Ok((lookup(&edge.source)?, lookup(&edge.target)?))
            })
            .collect()
    }

    fn node_index(&self) -> Result<HashMap<&str, usize>> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.id.as_str(), i).is_some() {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
        }
        Ok(index)
    }

    /// Distinct undirected neighbors of every node, by node index.
    /// Self-loops are ignored.
    pub fn neighbor_sets(&self) -> Result<Vec<HashSet<usize>>> {
        let resolved = self.resolve_edges()?;
        let mut neighbors = vec![HashSet::new(); self.nodes.len()];
        for (src, tgt) in resolved {
            if src != tgt {
                neighbors[src].insert(tgt);
                neighbors[tgt].insert(src);
            }
        }
        Ok(neighbors)
    }

    /// Number of edges of each kind.
    pub fn edge_counts(&self) -> BTreeMap<EdgeKind, usize> {
        let mut counts = BTreeMap::new();
        for edge in &self.edges {
            *counts.entry(edge.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Collapse same-kind parallel edges according to `policy`.
    ///
    /// The first occurrence keeps its direction and position in the edge
    /// list; later duplicates add their weight to it.
    pub fn merge_parallel_edges(&mut self, policy: EdgeMerge) {
        if policy == EdgeMerge::Keep {
            return;
        }

        let mut merged: Vec<Edge> = Vec::with_capacity(self.edges.len());
        let mut seen: HashMap<(String, String, EdgeKind), usize> = HashMap::new();
        for edge in self.edges.drain(..) {
            let (a, b) = edge.unordered_pair();
            let key = (a.to_string(), b.to_string(), edge.kind);
            match seen.get(&key) {
                Some(&at) => {
                    merged[at].weight = (merged[at].weight + edge.weight).min(1.0);
                }
                None => {
                    seen.insert(key, merged.len());
                    merged.push(edge);
                }
            }
        }

        self.edges = merged;
        self.metadata.total_edges = self.edges.len();
    }

    /// Derive a filtered view. The graph itself is not modified.
    pub fn filter(&self, filter: &GraphFilter) -> GraphView<'_> {
        let needle = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let nodes: Vec<&Node> = self
            .nodes
            .iter()
            .filter(|n| needle.as_deref().map_or(true, |q| n.matches(q)))
            .collect();
        let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

        let edges = self
            .edges
            .iter()
            .filter(|e| filter.edge_kind.map_or(true, |kind| e.kind == kind))
            .filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
            .collect();

        GraphView { nodes, edges }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a graph document. Totals in the metadata are recomputed from
    /// the actual node and edge lists.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut graph: Graph = serde_json::from_str(json)?;
        graph.metadata.total_nodes = graph.nodes.len();
        graph.metadata.total_edges = graph.edges.len();
        Ok(graph)
    }
}

/// Criteria for a [`GraphView`].
#[derive(Debug, Clone, Default)]
pub struct GraphFilter {
    /// Keep only edges of this kind.
    pub edge_kind: Option<EdgeKind>,
    /// Free-text search over titles, patent ids and inventors.
    pub query: Option<String>,
}

/// A read-only subset of a graph for display.
#[derive(Debug, Clone)]
pub struct GraphView<'a> {
    pub nodes: Vec<&'a Node>,
    pub edges: Vec<&'a Edge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let nodes = vec![
            Node::new("a", "US1000001")
                .with_title("Smart Robotics System")
                .with_inventors(["Jane Doe"]),
            Node::new("b", "US1000002").with_inventors(["John Smith"]),
            Node::new("c", "US1000003").with_category(Category::Robotics),
        ];
        let edges = vec![
            Edge::new("a", "b", 0.5, EdgeKind::Citation),
            Edge::new("b", "c", 0.4, EdgeKind::Similarity),
            Edge::new("c", "a", 0.3, EdgeKind::Inventor),
        ];
        Graph::new(nodes, edges, 1, Some("a".to_string()))
    }

    // ── Validation ─────────────────────

    #[test]
    fn valid_graph_passes() {
        let g = triangle();
        assert!(g.validate().is_ok());
        assert_eq!(g.resolve_edges().unwrap(), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn dangling_edge_is_integrity_error() {
        let mut g = triangle();
        g.edges.push(Edge::new("a", "ghost", 0.5, EdgeKind::Citation));
        match g.validate() {
            Err(GraphError::GraphIntegrity { edge, node_id }) => {
                assert_eq!(edge, 3);
                assert_eq!(node_id, "ghost");
            }
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut g = triangle();
        g.nodes.push(Node::new("b", "US9999999"));
        assert!(matches!(g.validate(), Err(GraphError::DuplicateNodeId(id)) if id == "b"));
    }

    #[test]
    fn weight_out_of_range_rejected() {
        let mut g = triangle();
        g.edges[1].weight = 1.5;
        assert!(matches!(g.validate(), Err(GraphError::InvalidWeight { edge: 1, .. })));
        g.edges[1].weight = f64::NAN;
        assert!(matches!(g.validate(), Err(GraphError::InvalidWeight { edge: 1, .. })));
    }

    #[test]
    fn missing_center_rejected() {
        let mut g = triangle();
        g.metadata.center_node = Some("zzz".to_string());
        assert!(matches!(g.validate(), Err(GraphError::MissingCenter(_))));
    }

    // ── Neighbors and merging ─────────────────────

    #[test]
    fn neighbor_sets_are_undirected_and_distinct() {
        let mut g = triangle();
        g.edges.push(Edge::new("b", "a", 0.2, EdgeKind::Similarity));
        g.edges.push(Edge::new("c", "c", 0.2, EdgeKind::Similarity));
        let neighbors = g.neighbor_sets().unwrap();
        assert_eq!(neighbors[0].len(), 2);
        assert!(neighbors[1].contains(&0));
        assert!(!neighbors[2].contains(&2));
    }

    #[test]
    fn merge_collapses_same_kind_pairs_only() {
        let mut g = triangle();
        g.edges.push(Edge::new("b", "a", 0.7, EdgeKind::Citation));
        g.edges.push(Edge::new("a", "b", 0.2, EdgeKind::Similarity));
        g.merge_parallel_edges(EdgeMerge::Merge);

        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.metadata.total_edges, 4);
        assert_eq!(g.edges[0].source, "a");
        assert_eq!(g.edges[0].weight, 1.0);
        assert_eq!(g.edge_counts()[&EdgeKind::Similarity], 2);
    }

    #[test]
    fn keep_policy_is_noop() {
        let mut g = triangle();
        g.edges.push(Edge::new("b", "a", 0.7, EdgeKind::Citation));
        let before = g.clone();
        g.merge_parallel_edges(EdgeMerge::Keep);
        assert_eq!(g, before);
    }

    // ── Views ─────────────────────

    #[test]
    fn filter_by_kind_and_search() {
        let g = triangle();
        let before = g.clone();

        let by_kind = g.filter(&GraphFilter {
            edge_kind: Some(EdgeKind::Similarity),
            query: None,
        });
        assert_eq!(by_kind.nodes.len(), 3);
        assert_eq!(by_kind.edges.len(), 1);

        let by_inventor = g.filter(&GraphFilter {
            edge_kind: None,
            query: Some("jane".to_string()),
        });
        assert_eq!(by_inventor.nodes.len(), 1);
        assert_eq!(by_inventor.nodes[0].id, "a");
        assert!(by_inventor.edges.is_empty());

        let by_patent = g.filter(&GraphFilter {
            edge_kind: None,
            query: Some("us100000".to_string()),
        });
        assert_eq!(by_patent.nodes.len(), 3);

        assert_eq!(g, before);
    }

    #[test]
    fn blank_query_matches_everything() {
        let g = triangle();
        let view = g.filter(&GraphFilter {
            edge_kind: None,
            query: Some("   ".to_string()),
        });
        assert_eq!(view.nodes.len(), 3);
        assert_eq!(view.edges.len(), 3);
    }

    // ── JSON ─────────────────────

    #[test]
    fn json_uses_dashboard_field_names() {
        let g = triangle();
        let value: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();
        assert_eq!(value["metadata"]["totalNodes"], 3);
        assert_eq!(value["metadata"]["centerNode"], "a");
        assert_eq!(value["edges"][0]["type"], "citation");
        assert_eq!(value["nodes"][2]["category"], "Robotics");
        assert_eq!(value["nodes"][2]["color"], "#f97316");
        assert!(value["nodes"][0]["x"].is_number());
        assert!(value["nodes"][0]["patentId"].is_string());
    }

    #[test]
    fn from_json_recomputes_totals() {
        let g = triangle();
        let mut value: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();
        value["metadata"]["totalEdges"] = serde_json::json!(99);
        let parsed = Graph::from_json(&value.to_string()).unwrap();
        assert_eq!(parsed.metadata.total_edges, 3);
        assert_eq!(parsed.nodes, g.nodes);
    }
}

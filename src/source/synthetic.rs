//! Synthetic citation neighborhoods.
//!
//! Builds a starburst around the focal patent: a wide ring of patents that
//! cite it, a tighter ring of patents it cites, and then inventor and
//! similarity links layered across everything. All randomness comes from
//! the caller's generator so a seed reproduces the same graph.

use crate::error::{GraphError, Result};
use crate::graph::{Category, Edge, EdgeKind, EdgeMerge, Graph, Node, Position};
use crate::source::{validate_patent_id, PatentGraphSource};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Word pools for synthetic titles and inventor names.
mod pools {
    pub const ADJECTIVES: &[&str] = &[
        "Advanced",
        "Smart",
        "Intelligent",
        "Automated",
        "Enhanced",
        "Novel",
        "Improved",
    ];
    pub const DOMAINS: &[&str] = &[
        "Machine Learning",
        "Data Processing",
        "Image Recognition",
        "Signal Processing",
        "Computer Vision",
        "Neural Networks",
    ];
    pub const NOUNS: &[&str] = &[
        "System",
        "Method",
        "Apparatus",
        "Device",
        "Process",
        "Technique",
        "Algorithm",
    ];
    pub const FIRST_NAMES: &[&str] = &[
        "John", "Jane", "Michael", "Sarah", "David", "Lisa", "Robert", "Emily", "James", "Maria",
    ];
    pub const LAST_NAMES: &[&str] = &[
        "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
        "Rodriguez", "Martinez",
    ];
}

/// Center, citing ring, cited ring.
const CLUSTER_COUNT: usize = 3;
const CENTER_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ring {
    Citing,
    Cited,
}

impl Ring {
    fn label(&self) -> &'static str {
        match self {
            Ring::Citing => "citing",
            Ring::Cited => "cited",
        }
    }
}

/// Tunables for synthetic graph generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOptions {
    /// Patents citing the focal patent.
    #[serde(default = "default_citing_count")]
    pub citing_count: usize,

    /// Patents cited by the focal patent.
    #[serde(default = "default_cited_count")]
    pub cited_count: usize,

    #[serde(default = "default_citing_radius")]
    pub citing_radius: f64,

    #[serde(default = "default_cited_radius")]
    pub cited_radius: f64,

    /// Half-width of the uniform radial offset.
    #[serde(default = "default_radial_jitter")]
    pub radial_jitter: f64,

    /// Half-width of the uniform height offset.
    #[serde(default = "default_height_jitter")]
    pub height_jitter: f64,

    /// Half-width of the uniform angular offset, in radians.
    #[serde(default = "default_angular_jitter")]
    pub angular_jitter: f64,

    #[serde(default = "default_inventor_link_probability")]
    pub inventor_link_probability: f64,

    #[serde(default = "default_similarity_link_probability")]
    pub similarity_link_probability: f64,

    #[serde(default)]
    pub edge_merge: EdgeMerge,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            citing_count: default_citing_count(),
            cited_count: default_cited_count(),
            citing_radius: default_citing_radius(),
            cited_radius: default_cited_radius(),
            radial_jitter: default_radial_jitter(),
            height_jitter: default_height_jitter(),
            angular_jitter: default_angular_jitter(),
            inventor_link_probability: default_inventor_link_probability(),
            similarity_link_probability: default_similarity_link_probability(),
            edge_merge: EdgeMerge::default(),
        }
    }
}

fn default_citing_count() -> usize {
    15
}

fn default_cited_count() -> usize {
    12
}

fn default_citing_radius() -> f64 {
    150.0
}

fn default_cited_radius() -> f64 {
    100.0
}

fn default_radial_jitter() -> f64 {
    25.0
}

fn default_height_jitter() -> f64 {
    50.0
}

fn default_angular_jitter() -> f64 {
    0.1
}

fn default_inventor_link_probability() -> f64 {
    0.3
}

fn default_similarity_link_probability() -> f64 {
    0.2
}

impl SynthesisOptions {
    fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("inventor_link_probability", self.inventor_link_probability),
            ("similarity_link_probability", self.similarity_link_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GraphError::InvalidArgument(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        for (name, v) in [
            ("citing_radius", self.citing_radius),
            ("cited_radius", self.cited_radius),
            ("radial_jitter", self.radial_jitter),
            ("height_jitter", self.height_jitter),
            ("angular_jitter", self.angular_jitter),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(GraphError::InvalidArgument(format!(
                    "{} must be a non-negative number, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

/// Generates synthetic citation graphs.
#[derive(Debug, Clone, Default)]
pub struct GraphSynthesizer {
    pub options: SynthesisOptions,
}

impl GraphSynthesizer {
    pub fn new(options: SynthesisOptions) -> Self {
        Self { options }
    }

    /// Generate the neighborhood of `central_patent_id`.
    ///
    /// Fails with [`GraphError::InvalidArgument`] for an empty or malformed
    /// id, or for options outside their valid ranges.
    pub fn generate<R: Rng + ?Sized>(&self, central_patent_id: &str, rng: &mut R) -> Result<Graph> {
        let patent_id = validate_patent_id(central_patent_id)?;
        self.options.validate()?;
        let opts = &self.options;

        let center = Self::center_node(patent_id);
        let center_id = center.id.clone();

        let citing = self.ring(Ring::Citing, opts.citing_count, opts.citing_radius, rng);
        let cited = self.ring(Ring::Cited, opts.cited_count, opts.cited_radius, rng);

        let mut edges = Vec::new();
        for node in &citing {
            edges.push(Edge::new(
                node.id.clone(),
                center_id.clone(),
                rng.gen_range(0.2..=1.0),
                EdgeKind::Citation,
            ));
        }
        for node in &cited {
            edges.push(Edge::new(
                center_id.clone(),
                node.id.clone(),
                rng.gen_range(0.3..=0.9),
                EdgeKind::Citation,
            ));
        }
        let citation_edges = edges.len();

        let mut nodes = Vec::with_capacity(1 + citing.len() + cited.len());
        nodes.push(center);
        nodes.extend(citing);
        nodes.extend(cited);

        self.link_shared_inventors(&nodes, &mut edges, rng);
        let inventor_edges = edges.len() - citation_edges;
        self.link_same_category(&nodes, &mut edges, rng);
        let similarity_edges = edges.len() - citation_edges - inventor_edges;

        debug!(
            patent = patent_id,
            nodes = nodes.len(),
            citation_edges,
            inventor_edges,
            similarity_edges,
            "synthesized citation graph"
        );

        let mut graph = Graph::new(nodes, edges, CLUSTER_COUNT, Some(center_id));
        graph.merge_parallel_edges(opts.edge_merge);
        Ok(graph)
    }

    fn center_node(patent_id: &str) -> Node {
        let mut node = Node::new(format!("center_{}", patent_id), patent_id)
            .with_title("Central Patent: AI-Based Image Recognition System")
            .with_inventors(["John Smith", "Jane Doe"])
            .with_category(Category::ArtificialIntelligence);
        node.filing_date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default();
        node.citation_count = 25;
        node.size = CENTER_SIZE;
        node
    }

    /// Place `count` patents evenly around a ring, each nudged by jitter.
    fn ring<R: Rng + ?Sized>(&self, ring: Ring, count: usize, radius: f64, rng: &mut R) -> Vec<Node> {
        let opts = &self.options;
        (0..count)
            .map(|i| {
                let angle = (i as f64 / count as f64) * PI * 2.0 + jitter(rng, opts.angular_jitter);
                let distance = radius + jitter(rng, opts.radial_jitter);
                let height = jitter(rng, opts.height_jitter);
                let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];

                let mut node = Node::new(
                    format!("{}_{}", ring.label(), i),
                    format!("US{}", rng.gen_range(1_000_000..10_000_000)),
                )
                .with_title(random_title(rng))
                .with_inventors(random_inventors(rng))
                .with_category(category)
                .with_position(Position::new(
                    angle.cos() * distance,
                    height,
                    angle.sin() * distance,
                ));
                node.filing_date = random_filing_date(rng);
                node.citation_count = rng.gen_range(1..=20);
                node.size = rng.gen_range(5.0..15.0);
                node
            })
            .collect()
    }

    fn link_shared_inventors<R: Rng + ?Sized>(&self, nodes: &[Node], edges: &mut Vec<Edge>, rng: &mut R) {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let shared = nodes[i]
                    .inventors
                    .iter()
                    .filter(|inv| nodes[j].inventors.contains(inv))
                    .count();
                if shared > 0 && rng.gen_bool(self.options.inventor_link_probability) {
                    edges.push(Edge::new(
                        nodes[i].id.clone(),
                        nodes[j].id.clone(),
                        (shared as f64 * 0.3).min(1.0),
                        EdgeKind::Inventor,
                    ));
                }
            }
        }
    }

    fn link_same_category<R: Rng + ?Sized>(&self, nodes: &[Node], edges: &mut Vec<Edge>, rng: &mut R) {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if nodes[i].category == nodes[j].category
                    && rng.gen_bool(self.options.similarity_link_probability)
                {
                    edges.push(Edge::new(
                        nodes[i].id.clone(),
                        nodes[j].id.clone(),
                        rng.gen_range(0.1..=0.5),
                        EdgeKind::Similarity,
                    ));
                }
            }
        }
    }
}

/// Uniform offset in (-amount, amount); zero when `amount` is zero.
fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f64) -> f64 {
    if amount > 0.0 {
        rng.gen_range(-amount..amount)
    } else {
        0.0
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

fn random_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{} {} {}",
        pick(rng, pools::ADJECTIVES),
        pick(rng, pools::DOMAINS),
        pick(rng, pools::NOUNS)
    )
}

/// One to three distinct inventor names.
fn random_inventors<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let count = rng.gen_range(1..=3);
    let mut inventors: Vec<String> = Vec::with_capacity(count);
    while inventors.len() < count {
        let name = format!(
            "{} {}",
            pick(rng, pools::FIRST_NAMES),
            pick(rng, pools::LAST_NAMES)
        );
        if !inventors.contains(&name) {
            inventors.push(name);
        }
    }
    inventors
}

fn random_filing_date<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let year = rng.gen_range(2020..2025);
    let month = rng.gen_range(1..=12);
    // Day capped at 28 so every month is valid.
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Seed derived from the patent id, so unseeded sources stay reproducible.
pub fn seed_for(patent_id: &str) -> u64 {
    let hash = Sha256::digest(patent_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

/// A [`PatentGraphSource`] backed by [`GraphSynthesizer`].
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    synthesizer: GraphSynthesizer,
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new(options: SynthesisOptions) -> Self {
        Self {
            synthesizer: GraphSynthesizer::new(options),
            seed: None,
        }
    }

    /// Use a fixed seed instead of one derived from the patent id.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.synthesizer.options
    }
}

impl PatentGraphSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn fetch(&self, central_patent_id: &str) -> Result<Graph> {
        let patent_id = validate_patent_id(central_patent_id)?;
        let seed = self.seed.unwrap_or_else(|| seed_for(patent_id));
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = self.synthesizer.generate(patent_id, &mut rng)?;
        info!(
            patent = patent_id,
            seed,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "synthesized citation graph"
        );
        Ok(graph)
    }
}

//! Property tests over generated graphs.

use citegraph::{
    compute_metrics, Edge, EdgeKind, ForceDirectedLayout, Graph, GraphSynthesizer, Node, Position,
    SynthesisOptions,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

// -- Strategy helpers --

fn arb_options() -> impl Strategy<Value = SynthesisOptions> {
    (0usize..20, 0usize..20, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(citing_count, cited_count, inventor, similarity)| SynthesisOptions {
            citing_count,
            cited_count,
            inventor_link_probability: inventor,
            similarity_link_probability: similarity,
            ..Default::default()
        },
    )
}

/// Small arbitrary graphs, including ones with parallel edges and self-loops.
fn arb_graph() -> impl Strategy<Value = Graph> {
    (1usize..12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n, 0.0f64..=1.0), 0..30);
        let coords = prop::collection::vec((-200.0f64..200.0, -200.0f64..200.0, -200.0f64..200.0), n);
        (edges, coords).prop_map(move |(edges, coords)| {
            let nodes = coords
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, z))| {
                    Node::new(format!("n{}", i), format!("US{}", 1_000_000 + i))
                        .with_position(Position::new(x, y, z))
                })
                .collect();
            let edges = edges
                .into_iter()
                .map(|(a, b, w)| Edge::new(format!("n{}", a), format!("n{}", b), w, EdgeKind::Similarity))
                .collect();
            Graph::new(nodes, edges, 1, Some("n0".to_string()))
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_graphs_are_well_formed(seed in any::<u64>(), options in arb_options()) {
        let expected_nodes = 1 + options.citing_count + options.cited_count;
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = GraphSynthesizer::new(options).generate("US10123456", &mut rng).unwrap();

        prop_assert_eq!(graph.node_count(), expected_nodes);
        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), graph.node_count());
        for edge in &graph.edges {
            prop_assert!(ids.contains(edge.source.as_str()));
            prop_assert!(ids.contains(edge.target.as_str()));
            prop_assert!((0.0..=1.0).contains(&edge.weight));
        }
        let citations = graph.edges.iter().filter(|e| e.kind == EdgeKind::Citation).count();
        prop_assert_eq!(citations, expected_nodes - 1);
    }

    #[test]
    fn layout_is_deterministic(graph in arb_graph(), iterations in 0usize..20) {
        let engine = ForceDirectedLayout::default();
        let a = engine.layout(&graph, iterations).unwrap();
        let b = engine.layout(&graph, iterations).unwrap();
        for (x, y) in a.nodes.iter().zip(&b.nodes) {
            prop_assert_eq!(x.position.x.to_bits(), y.position.x.to_bits());
            prop_assert_eq!(x.position.y.to_bits(), y.position.y.to_bits());
            prop_assert_eq!(x.position.z.to_bits(), y.position.z.to_bits());
        }
        prop_assert_eq!(&a.edges, &graph.edges);
        if iterations == 0 {
            prop_assert_eq!(a.positions(), graph.positions());
        }
    }

    #[test]
    fn metrics_stay_in_range(graph in arb_graph()) {
        let metrics = compute_metrics(&graph).unwrap();
        prop_assert_eq!(&metrics, &compute_metrics(&graph).unwrap());

        prop_assert_eq!(metrics.centrality_scores.len(), graph.node_count());
        for score in metrics.centrality_scores.values() {
            prop_assert!((0.0..=1.0).contains(score));
        }
        prop_assert!((0.0..=1.0).contains(&metrics.network_density));
        prop_assert!((0.0..=1.0).contains(&metrics.clustering_coefficient));
        let apl = metrics.average_path_length;
        prop_assert!(!apl.is_nan());
        prop_assert!(apl >= 0.0);
        if graph.edge_count() == 0 {
            prop_assert_eq!(apl, f64::INFINITY);
        }
        if graph.node_count() <= 1 {
            prop_assert_eq!(metrics.network_density, 0.0);
        }
    }
}

//! 3D force-directed layout.
//!
//! Every iteration pushes all node pairs apart with an inverse-square
//! repulsion, pulls each edge's endpoints toward a target separation in
//! proportion to the edge weight, then damps. The engine is a pure numeric
//! transform: no randomness, a fixed number of iterations, no early exit
//! unless the caller cancels.

use crate::error::{GraphError, Result};
use crate::graph::{Graph, Position};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// How damping is applied each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Forces move nodes immediately and every coordinate decays toward
    /// the origin by the damping factor.
    #[default]
    Decay,
    /// Forces accumulate into per-node velocities; the velocity is damped
    /// and then integrated into the position.
    Velocity,
}

/// Configuration for the force simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Repulsion constant; force is `repulsion / d²`.
    #[serde(default = "default_repulsion")]
    pub repulsion: f64,

    /// Spring constant along edges, scaled by edge weight.
    #[serde(default = "default_attraction")]
    pub attraction: f64,

    /// Rest length of an edge spring.
    #[serde(default = "default_target_distance")]
    pub target_distance: f64,

    #[serde(default = "default_damping")]
    pub damping: f64,

    #[serde(default)]
    pub mode: LayoutMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion: default_repulsion(),
            attraction: default_attraction(),
            target_distance: default_target_distance(),
            damping: default_damping(),
            mode: LayoutMode::default(),
        }
    }
}

fn default_repulsion() -> f64 {
    500.0
}

fn default_attraction() -> f64 {
    0.1
}

fn default_target_distance() -> f64 {
    100.0
}

fn default_damping() -> f64 {
    0.95
}

/// An edge resolved to node indices.
#[derive(Debug, Clone, Copy)]
struct Spring {
    source: usize,
    target: usize,
    weight: f64,
}

/// Force-directed layout engine.
#[derive(Debug, Clone, Default)]
pub struct ForceDirectedLayout {
    pub config: LayoutConfig,
}

impl ForceDirectedLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Run `iterations` steps and return a copy of `graph` with updated
    /// positions. Node and edge sets are unchanged; zero iterations returns
    /// the input positions untouched.
    ///
    /// Fails with [`GraphError::GraphIntegrity`] when an edge references a
    /// missing node, and with [`GraphError::InvalidArgument`] if a position
    /// would leave the finite range.
    pub fn layout(&self, graph: &Graph, iterations: usize) -> Result<Graph> {
        let never = AtomicBool::new(false);
        self.layout_with_cancel(graph, iterations, &never)
            .map(|(laid_out, _)| laid_out)
    }

    /// Like [`layout`](Self::layout), but checks `cancel` before each
    /// iteration. Returns the graph as positioned when the loop stopped
    /// together with the number of iterations that ran.
    pub fn layout_with_cancel(
        &self,
        graph: &Graph,
        iterations: usize,
        cancel: &AtomicBool,
    ) -> Result<(Graph, usize)> {
        self.validate_config()?;
        let springs: Vec<Spring> = graph
            .resolve_edges()?
            .into_iter()
            .zip(&graph.edges)
            .map(|((source, target), edge)| Spring {
                source,
                target,
                weight: edge.weight,
            })
            .collect();

        let mut positions = graph.positions();
        if let Some(node) = graph.nodes.iter().find(|n| !n.position.is_finite()) {
            return Err(GraphError::InvalidArgument(format!(
                "node {} has a non-finite position",
                node.id
            )));
        }

        let mut velocities = vec![Position::ORIGIN; positions.len()];
        let mut completed = 0;
        for _ in 0..iterations {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            match self.config.mode {
                LayoutMode::Decay => self.step_decay(&mut positions, &springs),
                LayoutMode::Velocity => self.step_velocity(&mut positions, &mut velocities, &springs),
            }
            completed += 1;
        }

        debug!(
            nodes = positions.len(),
            edges = springs.len(),
            requested = iterations,
            completed,
            mode = ?self.config.mode,
            "layout finished"
        );

        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(GraphError::InvalidArgument(format!(
                "layout diverged: node {} left the representable range",
                graph.nodes[i].id
            )));
        }

        let mut laid_out = graph.clone();
        for (node, position) in laid_out.nodes.iter_mut().zip(positions) {
            node.position = position;
        }
        Ok((laid_out, completed))
    }

    fn validate_config(&self) -> Result<()> {
        let c = &self.config;
        for (name, v) in [
            ("repulsion", c.repulsion),
            ("attraction", c.attraction),
            ("target_distance", c.target_distance),
            ("damping", c.damping),
        ] {
            if !v.is_finite() {
                return Err(GraphError::InvalidArgument(format!(
                    "layout {} must be finite, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Repulsive push that `from` receives from `other`, or `None` when the
    /// two coincide or are too close for the force to be representable.
    fn repulsion(&self, from: &Position, other: &Position) -> Option<Position> {
        let delta = from.minus(other);
        let dist = delta.length();
        if dist > 0.0 {
            let force = self.config.repulsion / (dist * dist);
            finite(delta.scaled(force / dist))
        } else {
            None
        }
    }

    /// Spring pull that moves `source` toward or away from `target`, or
    /// `None` when the two coincide or the pull overflows.
    fn attraction(&self, source: &Position, target: &Position, weight: f64) -> Option<Position> {
        let delta = target.minus(source);
        let dist = delta.length();
        if dist > 0.0 {
            let force = (dist - self.config.target_distance) * self.config.attraction * weight;
            finite(delta.scaled(force / dist))
        } else {
            None
        }
    }

    /// Forces are applied pair by pair as they are computed, then every
    /// coordinate is scaled by the damping factor.
    fn step_decay(&self, positions: &mut [Position], springs: &[Spring]) {
        let n = positions.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(push) = self.repulsion(&positions[i], &positions[j]) {
                    positions[i] += push;
                    positions[j] -= push;
                }
            }
        }

        for spring in springs {
            if let Some(pull) = self.attraction(
                &positions[spring.source],
                &positions[spring.target],
                spring.weight,
            ) {
                positions[spring.source] += pull;
                positions[spring.target] -= pull;
            }
        }

        for pos in positions.iter_mut() {
            *pos = pos.scaled(self.config.damping);
        }
    }

    fn step_velocity(&self, positions: &mut [Position], velocities: &mut [Position], springs: &[Spring]) {
        let n = positions.len();
        let mut forces = vec![Position::ORIGIN; n];

        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(push) = self.repulsion(&positions[i], &positions[j]) {
                    forces[i] += push;
                    forces[j] -= push;
                }
            }
        }

        for spring in springs {
            if let Some(pull) = self.attraction(
                &positions[spring.source],
                &positions[spring.target],
                spring.weight,
            ) {
                forces[spring.source] += pull;
                forces[spring.target] -= pull;
            }
        }

        for ((pos, vel), force) in positions.iter_mut().zip(velocities.iter_mut()).zip(forces) {
            *vel += force;
            *vel = vel.scaled(self.config.damping);
            *pos += *vel;
        }
    }
}

/// Drops forces that overflowed (an infinite magnitude along one axis
/// turns the zero axes into NaN).
fn finite(force: Position) -> Option<Position> {
    force.is_finite().then_some(force)
}

//! Per-tick force model.
//!
//! Each tick runs three passes that add into `Node::acc`, which is zeroed
//! first so no force state survives between ticks:
//!
//! 1. [`repulsion_phase`] — every node pushes every other node away, either
//!    exactly or through the Barnes-Hut [`QuadTree`].
//! 2. [`attraction_phase`] — every edge acts as a spring whose rest length is
//!    the sum of its endpoint radii.
//! 3. [`gravity_phase`] — optional pull toward the viewport center.
//!
//! Repulsion is computed in parallel with rayon. Workers only read the
//! nodes (or the quadtree built from a snapshot of them) and each writes its
//! own output slot; the results are added into the graph after the parallel
//! iterator has joined.

use glam::Vec2;
use rayon::prelude::*;

use crate::{
    body::{Body, Repulsion},
    config::Config,
    error::QuadTreeError,
    graph::{Edge, Graph, Node},
    quadtree::{QuadBody, QuadTree},
};

/// Runs all three passes, replacing every node's acceleration.
///
/// ### Parameters
/// - `graph` - Graph whose nodes receive the forces in `acc`.
/// - `tree` - Reusable quadtree; rebuilt here when `cfg.barnes_hut` is set.
/// - `cfg` - Force constants, Barnes-Hut settings and world bounds.
/// - `temperature` - Current annealing temperature; scales every force.
///
/// ### Returns
/// An error if a node lies outside `cfg.world_bounds()` and so cannot be
/// inserted into the tree. Accelerations are then only partially written.
pub fn apply_forces(
    graph: &mut Graph,
    tree: &mut QuadTree,
    cfg: &Config,
    temperature: f32,
) -> Result<(), QuadTreeError> {
    for node in &mut graph.nodes {
        node.acc = Vec2::ZERO;
    }
    repulsion_phase(graph, tree, cfg, temperature)?;
    attraction_phase(graph, cfg, temperature);
    gravity_phase(graph, cfg, temperature);
    Ok(())
}

fn snapshot(nodes: &[Node]) -> Vec<QuadBody> {
    nodes
        .iter()
        .enumerate()
        .map(|(id, n)| QuadBody {
            id,
            position: n.pos,
            mass: n.degree,
        })
        .collect()
}

/// Adds inverse-square repulsion between every pair of nodes.
///
/// With `cfg.barnes_hut` the tree is rebuilt over `cfg.world_bounds()` and
/// queried with `cfg.theta`; otherwise every pair is summed exactly.
pub fn repulsion_phase(
    graph: &mut Graph,
    tree: &mut QuadTree,
    cfg: &Config,
    temperature: f32,
) -> Result<(), QuadTreeError> {
    let law = Repulsion::new(cfg.repulsion_strength * temperature, cfg.distance_epsilon);

    let forces: Vec<Vec2> = if cfg.barnes_hut {
        let bodies = snapshot(&graph.nodes);
        tree.rebuild(cfg.world_bounds(), bodies.iter().copied())?;
        let tree = &*tree;
        bodies
            .par_iter()
            .map(|b| tree.compute_force(b, cfg.theta, &law))
            .collect()
    } else {
        exact_repulsion(&graph.nodes, &law)
    };

    for (node, force) in graph.nodes.iter_mut().zip(forces) {
        node.acc += force;
    }
    Ok(())
}

/// Exact O(n²) repulsion on every body, in input order.
pub fn exact_repulsion<B: Body + Sync>(bodies: &[B], law: &Repulsion) -> Vec<Vec2> {
    bodies
        .par_iter()
        .enumerate()
        .map(|(i, target)| {
            bodies
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, other)| law.between(target, other))
                .sum()
        })
        .collect()
}

/// Spring force along `edge`, as applied to its source.
///
/// Positive extension pulls the source toward the target. The target
/// receives the negation.
pub fn spring_force(
    edge: &Edge,
    source: &Node,
    target: &Node,
    cfg: &Config,
    temperature: f32,
) -> Vec2 {
    let delta = target.pos - source.pos;
    let dist = delta.length();
    if dist < cfg.distance_epsilon {
        return Vec2::ZERO;
    }
    let rest = source.radius + target.radius;
    let stiffness = source.radius.min(target.radius);
    let magnitude =
        cfg.attraction_strength * (dist - rest) / stiffness * edge.weight * temperature;
    delta / dist * magnitude
}

/// Adds spring attraction along every edge.
pub fn attraction_phase(graph: &mut Graph, cfg: &Config, temperature: f32) {
    for edge in &graph.edges {
        let force = spring_force(
            edge,
            &graph.nodes[edge.source],
            &graph.nodes[edge.target],
            cfg,
            temperature,
        );
        graph.nodes[edge.source].acc += force;
        graph.nodes[edge.target].acc -= force;
    }
}

/// Adds a pull toward the viewport center proportional to node degree.
///
/// Does nothing when `cfg.gravity` is off.
pub fn gravity_phase(graph: &mut Graph, cfg: &Config, temperature: f32) {
    if !cfg.gravity {
        return;
    }
    let center = cfg.center();
    let scale = cfg.gravity_strength * temperature;
    for node in &mut graph.nodes {
        let delta = center - node.pos;
        if delta.length_squared() < cfg.distance_epsilon * cfg.distance_epsilon {
            continue;
        }
        node.acc += delta.normalize() * node.degree * scale;
    }
}

//! Graph model: nodes with physical state, weighted edges, and the
//! deterministic initial layouts.

use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    body::Body,
    config::{DEFAULT_SPACING, InitialLayout},
    error::ImportError,
    geometry::Rect,
    types::NodeId,
};

/// Smallest radius a node is drawn and simulated with.
pub const MIN_RADIUS: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub group: i64,
    /// Sum of incident edge weights; doubles as the node's mass.
    pub degree: f32,
    pub radius: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    /// Set while the user holds the node. Selected nodes are not integrated.
    pub selected: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, group: i64) -> Self {
        Self {
            name: name.into(),
            group,
            degree: 0.0,
            radius: MIN_RADIUS,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            selected: false,
        }
    }

    /// Drops all momentum.
    #[inline]
    pub fn halt(&mut self) {
        self.vel = Vec2::ZERO;
        self.acc = Vec2::ZERO;
    }
}

impl Body for Node {
    #[inline]
    fn mass(&self) -> f32 {
        self.degree
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.pos
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    total_degree: f32,
}

/// Radius derived from degree: `max(sqrt(degree), MIN_RADIUS)`.
#[inline]
pub fn radius_for_degree(degree: f32) -> f32 {
    degree.max(0.0).sqrt().max(MIN_RADIUS)
}

impl Graph {
    /// Builds a graph from nodes and `(source, target, weight)` triples.
    ///
    /// Zero weights become 1, negative weights and dangling endpoints are
    /// rejected. Degrees, radii and the total degree are derived here once
    /// and never recomputed.
    pub fn new(
        nodes: Vec<Node>,
        edges: impl IntoIterator<Item = (usize, usize, f32)>,
    ) -> Result<Self, ImportError> {
        let mut graph = Graph {
            nodes,
            edges: Vec::new(),
            total_degree: 0.0,
        };
        let node_count = graph.nodes.len();

        for (i, (source, target, weight)) in edges.into_iter().enumerate() {
            for node in [source, target] {
                if node >= node_count {
                    return Err(ImportError::EdgeEndpoint {
                        edge: i,
                        node,
                        node_count,
                    });
                }
            }
            if weight < 0.0 {
                return Err(ImportError::NegativeWeight { edge: i, weight });
            }
            let weight = if weight == 0.0 { 1.0 } else { weight };

            graph.nodes[source].degree += weight;
            graph.nodes[target].degree += weight;
            graph.total_degree += weight;
            graph.edges.push(Edge {
                source,
                target,
                weight,
            });
        }

        for node in &mut graph.nodes {
            node.radius = radius_for_degree(node.degree);
        }

        Ok(graph)
    }

    #[inline]
    pub fn total_degree(&self) -> f32 {
        self.total_degree
    }

    /// Length scale `sqrt(area / total_degree)`; `None` for an edgeless graph.
    pub fn characteristic_length(&self, viewport: Vec2) -> Option<f32> {
        (self.total_degree > 0.0).then(|| (viewport.x * viewport.y / self.total_degree).sqrt())
    }

    /// Places every node according to `layout` and clears its momentum.
    ///
    /// Both layouts are deterministic, so calling this again restores
    /// exactly the same positions. Large spirals may reach past the world
    /// bounds; [`Graph::clamp_into`] pulls them back before simulating.
    ///
    /// ### Parameters
    /// - `layout` - Placement rule.
    /// - `viewport` - Viewport extent; the spiral is centered in it and the
    ///   random scatter covers it.
    pub fn apply_layout(&mut self, layout: InitialLayout, viewport: Vec2) {
        let center = viewport * 0.5;
        match layout {
            InitialLayout::Phyllotaxis { spacing } => self.spiral(center, spacing),
            InitialLayout::Fitted => {
                let spacing = self
                    .characteristic_length(viewport)
                    .unwrap_or(DEFAULT_SPACING);
                self.spiral(center, spacing);
            }
            InitialLayout::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                for node in &mut self.nodes {
                    node.pos = Vec2::new(
                        rng.random_range(0.0..viewport.x),
                        rng.random_range(0.0..viewport.y),
                    );
                    node.halt();
                }
            }
        }
    }

    fn spiral(&mut self, center: Vec2, spacing: f32) {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let r = spacing * (0.5 + i as f32).sqrt();
            let angle = i as f32 * golden_angle;
            node.pos = center + Vec2::from_angle(angle) * r;
            node.halt();
        }
    }

    /// Clamps every node into `bounds`.
    ///
    /// The quadtree root is the world rectangle, so no position may sit
    /// outside it when a tick starts.
    pub fn clamp_into(&mut self, bounds: Rect) {
        for node in &mut self.nodes {
            node.pos = bounds.clamp(node.pos);
        }
    }

    /// Positions only, in node order.
    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|n| n.pos).collect()
    }
}

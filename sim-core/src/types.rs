/// Identifier for a node in a [`crate::graph::Graph`].
///
/// This is an index into `Graph::nodes`. Indices are assigned at import
/// and stay stable for the lifetime of the graph.
pub type NodeId = usize;

/// Identifier for a cell in a [`crate::quadtree::QuadTree`] arena.
///
/// Only meaningful until the next rebuild of the tree it came from.
pub type CellId = usize;

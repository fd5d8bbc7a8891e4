//! Error types for the layout engine.

use std::path::PathBuf;

use glam::Vec2;
use thiserror::Error;

use crate::types::NodeId;

/// Errors raised while inserting into a [`crate::quadtree::QuadTree`].
#[derive(Debug, Error, PartialEq)]
pub enum QuadTreeError {
    /// The body lies outside the root region. The root must be sized to
    /// contain the whole position-clamped world, so this is a caller bug.
    #[error("node {node} at ({}, {}) lies outside the quadtree root", .position.x, .position.y)]
    OutOfBounds { node: NodeId, position: Vec2 },
}

/// Errors raised by the simulation scheduler and its mutation surface.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error(transparent)]
    QuadTree(#[from] QuadTreeError),
}

/// Errors raised while reading or validating a parameters file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised while importing a graph description.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read graph {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("edge {edge} references node {node}, but the graph has {node_count} nodes")]
    EdgeEndpoint {
        edge: usize,
        node: usize,
        node_count: usize,
    },

    #[error("edge {edge} has negative weight {weight}")]
    NegativeWeight { edge: usize, weight: f32 },
}

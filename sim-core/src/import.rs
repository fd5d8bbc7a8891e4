//! JSON graph import.
//!
//! Accepts the node-link format
//! `{ "nodes": [{ "name", "group" }], "links": [{ "source", "target", "value" }] }`
//! where `source`/`target` are node indices and `value` is the optional
//! edge weight.

use std::{fs, path::Path};

use serde::Deserialize;
use tracing::info;

use crate::{
    config::Config,
    error::ImportError,
    graph::{Graph, Node},
};

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default, alias = "edges")]
    links: Vec<LinkRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    #[serde(default, alias = "id")]
    name: String,
    #[serde(default)]
    group: i64,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    source: usize,
    target: usize,
    #[serde(default, alias = "weight")]
    value: Option<f32>,
}

/// Parses a graph and places it with the configured initial layout.
///
/// ### Parameters
/// - `text` - Node-link JSON (`nodes` plus `links` or `edges`).
/// - `cfg` - Supplies the initial layout and viewport.
///
/// ### Returns
/// The placed graph, or an error for malformed JSON, dangling endpoints or
/// negative weights.
pub fn parse_graph(text: &str, cfg: &Config) -> Result<Graph, ImportError> {
    let file: GraphFile = serde_json::from_str(text)?;
    let nodes = file
        .nodes
        .into_iter()
        .map(|n| Node::new(n.name, n.group))
        .collect();
    let edges = file
        .links
        .into_iter()
        .map(|l| (l.source, l.target, l.value.unwrap_or(0.0)));

    let mut graph = Graph::new(nodes, edges)?;
    graph.apply_layout(cfg.initial_layout, cfg.viewport());
    Ok(graph)
}

/// Reads and parses a graph file.
pub fn load_graph(path: impl AsRef<Path>, cfg: &Config) -> Result<Graph, ImportError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse_graph(&text, cfg)?;
    info!(
        path = %path.display(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph loaded"
    );
    Ok(graph)
}

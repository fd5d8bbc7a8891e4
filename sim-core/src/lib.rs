//! Core force-directed graph layout engine.
//!
//! Main components:
//! - [`geometry`] — rectangles and vector helpers.
//! - [`body`] — the `Body` capability and the repulsion law.
//! - [`quadtree`] — Barnes-Hut spatial index.
//! - [`forces`] — repulsion, attraction and gravity passes.
//! - [`integrator`] — velocity/position update with damping and clamping.
//! - [`temperature`] — annealing schedule.
//! - [`simulation`] — per-tick pipeline and the interaction surface.
//! - [`runner`] — background thread driving a shared simulation.
//! - [`graph`] / [`import`] — graph model and JSON import.
//! - [`config`] / [`error`] — parameters and error types.
//! - [`types`] — shared type aliases and IDs.

pub mod body;
pub mod config;
pub mod error;
pub mod forces;
pub mod geometry;
pub mod graph;
pub mod import;
pub mod integrator;
pub mod quadtree;
pub mod runner;
pub mod simulation;
pub mod temperature;
pub mod types;

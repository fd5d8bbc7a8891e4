//! Turns accumulated acceleration into motion.

use tracing::warn;

use crate::{config::Config, geometry::clamp_length, graph::Graph};

/// Advances every free node by `dt`.
///
/// For each node that is not selected:
/// 1. `vel += acc`, then damped by `1 - cfg.velocity_decay`.
/// 2. Speed clamped to `cfg.max_speed_per_temperature * temperature`.
/// 3. `pos += vel * dt`, clamped into `cfg.world_bounds()`.
///
/// Selected nodes keep their position and lose all momentum, so they do
/// not fling away when released.
///
/// ### Parameters
/// - `graph` - Graph whose `acc` was filled by the force passes.
/// - `cfg` - Damping, speed limit and world bounds.
/// - `temperature` - Current annealing temperature; bounds the speed.
/// - `dt` - Sub-step length in seconds.
pub fn integrate(graph: &mut Graph, cfg: &Config, temperature: f32, dt: f32) {
    let bounds = cfg.world_bounds();
    let max_speed = cfg.max_speed_per_temperature * temperature;
    let damping = 1.0 - cfg.velocity_decay;

    for (id, node) in graph.nodes.iter_mut().enumerate() {
        if node.selected {
            node.halt();
            continue;
        }

        node.vel = clamp_length((node.vel + node.acc) * damping, max_speed);
        node.pos = bounds.clamp(node.pos + node.vel * dt);

        if !node.pos.is_finite() {
            warn!(node = id, "non-finite position after integration");
            debug_assert!(node.pos.is_finite(), "node {id} diverged");
        }
    }
}

//! The simulation scheduler.
//!
//! [`Simulation`] owns the graph, the configuration, the annealing state and
//! the reusable quadtree. One call to [`Simulation::tick`] runs the whole
//! pipeline (forces, integration, cooling) once per sub-step. Everything the
//! interaction side may change goes through the mutation methods here so it
//! can be done under the same lock as a tick.

use glam::Vec2;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::SimError,
    forces,
    graph::{Graph, Node},
    integrator,
    quadtree::QuadTree,
    temperature::Temperature,
    types::NodeId,
};

#[derive(Debug)]
pub struct Simulation {
    graph: Graph,
    cfg: Config,
    temperature: Temperature,
    tree: QuadTree,
    ticks: u64,
}

impl Simulation {
    /// Wraps an imported graph.
    ///
    /// Positions are kept as given except that they are clamped into
    /// `cfg.world_bounds()`, which is also the quadtree root.
    pub fn new(mut graph: Graph, cfg: Config) -> Self {
        graph.clamp_into(cfg.world_bounds());
        let temperature = Temperature::new(
            cfg.initial_temperature,
            cfg.target_temperature,
            cfg.temperature_decay,
        );
        let tree = QuadTree::new(cfg.world_bounds(), cfg.capacity, cfg.max_depth);
        Self {
            graph,
            cfg,
            temperature,
            tree,
            ticks: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Swaps in new parameters.
    ///
    /// The quadtree picks up the new bounds and capacity on the next tick,
    /// and nodes outside shrunken bounds are pulled back in. The temperature
    /// keeps its current value but follows the new schedule.
    pub fn set_config(&mut self, cfg: Config) {
        self.graph.clamp_into(cfg.world_bounds());
        self.temperature.retune(
            cfg.initial_temperature,
            cfg.target_temperature,
            cfg.temperature_decay,
        );
        self.tree = QuadTree::new(cfg.world_bounds(), cfg.capacity, cfg.max_depth);
        self.cfg = cfg;
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.value()
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances the simulation by `dt` seconds, split into
    /// `cfg.substeps` equal sub-steps.
    ///
    /// ### Parameters
    /// - `dt` - Elapsed time for the whole tick, in seconds.
    ///
    /// ### Returns
    /// `Ok(())` once every sub-step has run, or the first quadtree error.
    /// A failed tick leaves the tick counter unchanged.
    pub fn tick(&mut self, dt: f32) -> Result<(), SimError> {
        let substeps = self.cfg.substeps.max(1);
        let sub_dt = dt / substeps as f32;
        for _ in 0..substeps {
            self.step(sub_dt)?;
        }
        self.ticks += 1;
        debug!(
            tick = self.ticks,
            temperature = self.temperature.value(),
            cells = self.tree.cell_count(),
            "tick"
        );
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<(), SimError> {
        let t = self.temperature.value();
        forces::apply_forces(&mut self.graph, &mut self.tree, &self.cfg, t)?;
        integrator::integrate(&mut self.graph, &self.cfg, t, dt);
        self.temperature.advance(dt);
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SimError> {
        self.graph.nodes.get_mut(id).ok_or(SimError::UnknownNode(id))
    }

    /// Moves a node, clamped into the world bounds.
    ///
    /// Used while dragging; the node should be selected so the integrator
    /// leaves it where it was put.
    pub fn set_node_position(&mut self, id: NodeId, pos: Vec2) -> Result<(), SimError> {
        let bounds = self.cfg.world_bounds();
        let node = self.node_mut(id)?;
        node.pos = bounds.clamp(pos);
        Ok(())
    }

    /// Marks a node as held or released.
    ///
    /// Selecting halts the node. Releasing a held node reheats the layout
    /// so it re-settles around the new position.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<(), SimError> {
        let node = self.node_mut(id)?;
        let released = node.selected && !selected;
        node.selected = selected;
        if selected {
            node.halt();
        }
        if released {
            debug!(node = id, "node released");
            self.temperature.reset();
        }
        Ok(())
    }

    /// Releases every held node.
    pub fn release_selection(&mut self) {
        let mut any = false;
        for node in self.graph.nodes.iter_mut().filter(|n| n.selected) {
            node.selected = false;
            any = true;
        }
        if any {
            self.temperature.reset();
        }
    }

    /// Restores the initial layout and drops all momentum.
    pub fn reset_positions(&mut self) {
        self.graph.apply_layout(self.cfg.initial_layout, self.cfg.viewport());
        self.graph.clamp_into(self.cfg.world_bounds());
        info!(nodes = self.graph.nodes.len(), "layout reset");
    }

    pub fn reset_temperature(&mut self) {
        self.temperature.reset();
    }

    /// Node under `p`, preferring the last-drawn one when circles overlap.
    pub fn node_at(&self, p: Vec2) -> Option<NodeId> {
        self.graph
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, n)| n.pos.distance(p) <= n.radius)
            .map(|(id, _)| id)
    }
}

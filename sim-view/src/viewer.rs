//! Interactive graph layout viewer built with eframe/egui.
//!
//! [`Viewer`] never owns the layout state. The simulation runs on its own
//! thread behind [`Runner`]; each frame the viewer takes the lock once to
//! copy positions out, and again only when the user drags a node, resets
//! the layout, or edits parameters.

use eframe::App;
use glam::Vec2;
use sim_core::{
    config::Config,
    graph::Graph,
    runner::Runner,
    simulation::Simulation,
    types::NodeId,
};
use tracing::{info, warn};

use crate::palette::{PALETTE_SEED, Palette};

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 3.0;
const DEFAULT_ZOOM: f32 = 2.0;

/// Main application state for the interactive viewer.
///
/// Per-node data that never changes after import (names, groups, degrees,
/// radii, edges) is copied once at construction. Positions and the
/// annealing state are refreshed from the simulation every frame.
///
/// ### Camera
/// World space is the simulation's space (y grows downward). `focus` is the
/// world point drawn at the center of the canvas before `pan` is applied;
/// `zoom` scales world units to pixels.
pub struct Viewer {
    runner: Runner,
    cfg: Config,
    base_cfg: Config,
    palette: Palette,

    names: Vec<String>,
    groups: Vec<i64>,
    degrees: Vec<f32>,
    radii: Vec<f32>,
    edges: Vec<(NodeId, NodeId, f32)>,

    positions: Vec<Vec2>,
    temperature: f32,
    ticks: u64,
    hovered: Option<NodeId>,
    dragging: Option<NodeId>,

    focus: Vec2,
    zoom: f32,
    pan: egui::Vec2,
}

impl Viewer {
    /// Starts the simulation thread for `graph` and prepares the camera.
    pub fn new(graph: Graph, cfg: Config) -> std::io::Result<Self> {
        let names = graph.nodes.iter().map(|n| n.name.clone()).collect();
        let groups: Vec<i64> = graph.nodes.iter().map(|n| n.group).collect();
        let degrees = graph.nodes.iter().map(|n| n.degree).collect();
        let radii = graph.nodes.iter().map(|n| n.radius).collect();
        let edges = graph
            .edges
            .iter()
            .map(|e| (e.source, e.target, e.weight))
            .collect();
        let positions = graph.positions();
        let palette = Palette::for_groups(groups.iter().copied(), PALETTE_SEED);

        let focus = cfg.center();
        let temperature = cfg.initial_temperature;
        let runner = Runner::spawn(Simulation::new(graph, cfg.clone()))?;

        Ok(Self {
            runner,
            base_cfg: cfg.clone(),
            cfg,
            palette,
            names,
            groups,
            degrees,
            radii,
            edges,
            positions,
            temperature,
            ticks: 0,
            hovered: None,
            dragging: None,
            focus,
            zoom: DEFAULT_ZOOM,
            pan: egui::vec2(0.0, 0.0),
        })
    }

    /// Copies the current layout out of the simulation.
    fn sync(&mut self, hover_world: Option<Vec2>) {
        let sim = self.runner.shared().lock();
        self.positions.clear();
        self.positions.extend(sim.graph().nodes.iter().map(|n| n.pos));
        self.temperature = sim.temperature();
        self.ticks = sim.ticks();
        self.hovered = hover_world.and_then(|p| sim.node_at(p));
    }

    /// Restores the initial layout, reheats, and recenters the camera.
    fn reset(&mut self) {
        {
            let mut sim = self.runner.shared().lock();
            sim.release_selection();
            sim.reset_positions();
            sim.reset_temperature();
        }
        self.dragging = None;
        self.reset_camera();
        info!("viewer reset");
    }

    fn reset_camera(&mut self) {
        self.focus = self.cfg.center();
        self.zoom = DEFAULT_ZOOM;
        self.pan = egui::vec2(0.0, 0.0);
    }

    /// Selects the node under `world`, if any, so it can be dragged.
    fn grab(&self, world: Vec2) -> Option<NodeId> {
        let mut sim = self.runner.shared().lock();
        let id = sim.node_at(world)?;
        if let Err(e) = sim.set_selected(id, true) {
            warn!(error = %e, "cannot grab node");
            return None;
        }
        Some(id)
    }

    fn drag_to(&self, id: NodeId, world: Vec2) {
        if let Err(e) = self.runner.shared().lock().set_node_position(id, world) {
            warn!(error = %e, "cannot move node");
        }
    }

    /// Lets go of a dragged node; the simulation reheats around it.
    fn release(&self, id: NodeId) {
        if let Err(e) = self.runner.shared().lock().set_selected(id, false) {
            warn!(error = %e, "cannot release node");
        }
    }

    /// Hands the edited parameters to the simulation if they are valid.
    fn push_config(&self) {
        match self.cfg.validate() {
            Ok(()) => self.runner.shared().lock().set_config(self.cfg.clone()),
            Err(e) => warn!(error = %e, "ignoring invalid parameters"),
        }
    }

    /// Converts a world-space position to screen-space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + (p.x - self.focus.x) * self.zoom + self.pan.x,
            center.y + (p.y - self.focus.y) * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`] up to rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        Vec2::new(
            (p.x - center.x - self.pan.x) / self.zoom + self.focus.x,
            (p.y - center.y - self.pan.y) / self.zoom + self.focus.y,
        )
    }

    /// Scales the view by `factor`, keeping the world point under `pointer` fixed.
    fn zoom_at(&mut self, pointer: egui::Pos2, rect: egui::Rect, factor: f32) {
        let world_before = self.screen_to_world(pointer, rect);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let screen_after = self.world_to_screen(world_before, rect);
        self.pan += pointer - screen_after;
    }

    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    /// Builds the top panel UI (run controls, reset, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let paused = self.runner.is_paused();
                if ui
                    .button(if paused { "▶ Run" } else { "⏸ Pause" })
                    .clicked()
                {
                    self.runner.set_paused(!paused);
                }

                if ui.button("Reset (R)").clicked() {
                    self.reset();
                }

                if ui.button("Center view").clicked() {
                    self.reset_camera();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, MIN_ZOOM..=MAX_ZOOM).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let fps = ctx.input(|i| if i.stable_dt > 0.0 { 1.0 / i.stable_dt } else { 0.0 });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{fps:.0} fps"));
                ui.label(format!(
                    "tick = {:.2} ms",
                    self.runner.last_tick_duration().as_secs_f64() * 1000.0
                ));
                ui.separator();
                ui.label(format!("ticks = {}", self.ticks));
                ui.label(format!("temperature = {:.3}", self.temperature));
                ui.separator();
                ui.label(format!("edges = {}", self.edges.len()));
                ui.label(format!("nodes = {}", self.positions.len()));
            });
        });
    }

    /// Builds the right-hand panel for live parameter tuning.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");
                let mut changed = false;

                ui.separator();
                ui.label("Gravity");
                changed |= ui.checkbox(&mut self.cfg.gravity, "enabled").changed();
                changed |= Self::labeled_drag_f32(
                    ui,
                    "strength:",
                    &mut self.cfg.gravity_strength,
                    0.0..=5.0,
                    0.005,
                );

                ui.separator();
                ui.label("Repulsion");
                changed |= ui
                    .checkbox(&mut self.cfg.barnes_hut, "Barnes-Hut")
                    .changed();
                changed |= Self::labeled_drag_f32(ui, "theta:", &mut self.cfg.theta, 0.0..=2.0, 0.01);
                changed |= Self::labeled_drag_usize(
                    ui,
                    "leaf capacity:",
                    &mut self.cfg.capacity,
                    1..=64,
                    1.0,
                );
                changed |= Self::labeled_drag_f32(
                    ui,
                    "strength:",
                    &mut self.cfg.repulsion_strength,
                    0.0..=1000.0,
                    0.1,
                );

                ui.separator();
                ui.label("Springs");
                changed |= Self::labeled_drag_f32(
                    ui,
                    "strength:",
                    &mut self.cfg.attraction_strength,
                    0.0..=100.0,
                    0.05,
                );

                ui.separator();
                ui.label("Motion");
                changed |= Self::labeled_drag_f32(
                    ui,
                    "velocity decay:",
                    &mut self.cfg.velocity_decay,
                    0.0..=0.99,
                    0.01,
                );
                changed |= Self::labeled_drag_f32(
                    ui,
                    "cooling rate:",
                    &mut self.cfg.temperature_decay,
                    0.0..=10.0,
                    0.01,
                );

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = self.base_cfg.clone();
                    changed = true;
                }

                if changed {
                    self.push_config();
                }
            });
    }

    /// Builds the central panel where the graph is drawn and dragged.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            // Dragging a node moves it; dragging empty space pans.
            if response.drag_started()
                && let Some(p) = response.interact_pointer_pos()
            {
                self.dragging = self.grab(self.screen_to_world(p, rect));
            }
            if response.dragged() {
                match (self.dragging, response.interact_pointer_pos()) {
                    (Some(id), Some(p)) => self.drag_to(id, self.screen_to_world(p, rect)),
                    (None, _) => self.pan += response.drag_delta(),
                    _ => {}
                }
            }
            if response.drag_stopped()
                && let Some(id) = self.dragging.take()
            {
                self.release(id);
            }

            // Zoom around the mouse cursor.
            if response.hovered() {
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer = response.hover_pos().unwrap_or(rect.center());
                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    self.zoom_at(pointer, rect, factor);
                }
            }

            self.sync(hover_world);

            for &(source, target, weight) in &self.edges {
                let a = self.world_to_screen(self.positions[source], rect);
                let b = self.world_to_screen(self.positions[target], rect);
                let width = (weight.sqrt() * self.zoom).max(0.5);
                painter.line_segment([a, b], egui::Stroke::new(width, egui::Color32::LIGHT_GRAY));
            }

            for (i, &pos) in self.positions.iter().enumerate() {
                let p = self.world_to_screen(pos, rect);
                let r = (self.radii[i] * self.zoom).max(1.0);
                painter.circle_filled(p, r, self.palette.color(self.groups[i]));
            }

            if let Some(id) = self.hovered {
                let p = self.world_to_screen(self.positions[id], rect);
                let r = (self.radii[id] * self.zoom).max(1.0);
                painter.circle_filled(
                    p,
                    r,
                    egui::Color32::from_rgba_unmultiplied(128, 128, 128, 160),
                );
                painter.text(
                    p + egui::vec2(r + 4.0, 0.0),
                    egui::Align2::LEFT_CENTER,
                    format!(
                        "{}, Group: {}\nDegree: {}",
                        self.names[id], self.groups[id], self.degrees[id]
                    ),
                    egui::FontId::proportional(14.0),
                    ui.visuals().text_color(),
                );
            }
        });

        // The layout keeps moving on its own thread.
        ctx.request_repaint();
    }
}

impl App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let typing = ctx.memory(|m| m.focused().is_some());
        if !typing && ctx.input(|i| i.key_pressed(egui::Key::R)) {
            self.reset();
        }

        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

//! Simulation parameters.
//!
//! A [`Config`] is passed explicitly into the scheduler and the force model;
//! nothing in the engine reads process-wide state. Every field has a default,
//! so a parameters file only needs to list what it overrides.

use std::{fs, path::Path};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, geometry::Rect};

/// Spiral spacing used when nothing else is configured.
pub const DEFAULT_SPACING: f32 = 10.0;

/// Deterministic placement used at import and on `reset_positions`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialLayout {
    /// Golden-angle spiral around the viewport center.
    Phyllotaxis { spacing: f32 },
    /// Golden-angle spiral spaced by the graph's characteristic length
    /// `sqrt(viewport_area / total_degree)`.
    Fitted,
    /// Uniform scatter over the viewport from a fixed seed.
    Random { seed: u64 },
}

impl Default for InitialLayout {
    fn default() -> Self {
        InitialLayout::Phyllotaxis {
            spacing: DEFAULT_SPACING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport_width: f32,
    pub viewport_height: f32,

    pub gravity: bool,
    pub gravity_strength: f32,

    pub barnes_hut: bool,
    pub theta: f32,
    pub capacity: usize,
    pub max_depth: usize,

    pub repulsion_strength: f32,
    pub attraction_strength: f32,
    pub distance_epsilon: f32,

    pub velocity_decay: f32,
    pub max_speed_per_temperature: f32,
    pub position_bound_factor: f32,

    pub initial_temperature: f32,
    pub target_temperature: f32,
    pub temperature_decay: f32,

    pub substeps: u32,
    pub tick_interval_ms: u64,
    pub fixed_step: Option<f32>,
    pub max_delta_time: f32,

    pub initial_layout: InitialLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            gravity: true,
            gravity_strength: 0.05,
            barnes_hut: true,
            theta: 0.5,
            capacity: 4,
            max_depth: 32,
            repulsion_strength: 10.0,
            attraction_strength: 1.0,
            distance_epsilon: 0.1,
            velocity_decay: 0.1,
            max_speed_per_temperature: 10.0,
            position_bound_factor: 10.0,
            initial_temperature: 50.0,
            target_temperature: 1.0,
            temperature_decay: 0.5,
            substeps: 1,
            tick_interval_ms: 16,
            fixed_step: None,
            max_delta_time: 0.1,
            initial_layout: InitialLayout::default(),
        }
    }
}

impl Config {
    /// Reads and validates a JSON parameters file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(invalid("viewport", "extent must be positive"));
        }
        if !(self.theta >= 0.0) {
            return Err(invalid("theta", "must be non-negative"));
        }
        if self.capacity == 0 {
            return Err(invalid("capacity", "must be at least 1"));
        }
        if self.substeps == 0 {
            return Err(invalid("substeps", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.velocity_decay) {
            return Err(invalid("velocity_decay", "must lie in [0, 1)"));
        }
        if !(self.distance_epsilon > 0.0) {
            return Err(invalid("distance_epsilon", "must be positive"));
        }
        if !(self.position_bound_factor >= 1.0) {
            return Err(invalid("position_bound_factor", "must be at least 1"));
        }
        if !(self.initial_temperature >= 0.0 && self.target_temperature >= 0.0) {
            return Err(invalid("temperature", "must be non-negative"));
        }
        if !(self.temperature_decay >= 0.0) {
            return Err(invalid("temperature_decay", "must be non-negative"));
        }
        if let Some(step) = self.fixed_step
            && !(step > 0.0)
        {
            return Err(invalid("fixed_step", "must be positive"));
        }
        if !(self.max_delta_time > 0.0) {
            return Err(invalid("max_delta_time", "must be positive"));
        }
        Ok(())
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }

    /// Point gravity pulls toward.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.viewport() * 0.5
    }

    /// Region positions are clamped into after integration.
    ///
    /// The quadtree root uses the same rectangle, so every clamped position
    /// can be inserted.
    pub fn world_bounds(&self) -> Rect {
        Rect::from_center_size(self.center(), self.viewport() * self.position_bound_factor)
    }
}

//! The two facts the repulsion law needs from anything that repels.
//!
//! Graph nodes, quadtree bodies and aggregated quadtree cells all implement
//! [`Body`], so [`Repulsion::between`] is the only place the inverse-square
//! formula is written down.

use glam::Vec2;

pub trait Body {
    /// Effective mass (node degree, or the summed degree of a region).
    fn mass(&self) -> f32;
    fn position(&self) -> Vec2;
}

/// A point mass, used for aggregated quadtree cells and in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMass {
    pub position: Vec2,
    pub mass: f32,
}

impl Body for PointMass {
    #[inline]
    fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Inverse-square repulsion, scaled for one tick.
///
/// `strength` already folds in the repulsion constant and the current
/// temperature. Pairs closer than `epsilon` contribute nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Repulsion {
    pub strength: f32,
    pub epsilon: f32,
}

impl Repulsion {
    pub fn new(strength: f32, epsilon: f32) -> Self {
        Self { strength, epsilon }
    }

    /// Force exerted on `target` by `source`, pointing away from `source`.
    #[inline]
    pub fn between(&self, target: &impl Body, source: &impl Body) -> Vec2 {
        let delta = target.position() - source.position();
        let dist2 = delta.length_squared();
        if dist2 < self.epsilon * self.epsilon {
            return Vec2::ZERO;
        }
        let magnitude = self.strength * (target.mass() * source.mass()) / dist2;
        delta / dist2.sqrt() * magnitude
    }
}

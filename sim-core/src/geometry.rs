//! Geometry primitives shared by the quadtree, the force model and the integrator.
//!
//! Vector arithmetic comes from [`glam::Vec2`]; this module adds the
//! axis-aligned [`Rect`] used for quadtree regions and world bounds, plus
//! the few vector helpers glam does not provide in the exact shape we need.

use glam::Vec2;

/// Axis-aligned rectangle described by its top-left corner and size.
///
/// Containment is inclusive on every edge, so a point clamped into the
/// rectangle with [`Rect::clamp`] is always [`Rect::contains`]-ed by it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

/// Quadrant of a subdivided [`Rect`], in child storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Returns `true` if `p` lies inside the rectangle or on its border.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    /// Clamps `p` component-wise into the rectangle.
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }

    /// Picks the quadrant a point falls into.
    ///
    /// Points on the vertical midline go east and points on the horizontal
    /// midline go south, so every point maps to exactly one quadrant.
    #[inline]
    pub fn quadrant_of(&self, p: Vec2) -> Quadrant {
        let mid = self.center();
        match (p.y >= mid.y, p.x >= mid.x) {
            (false, false) => Quadrant::NorthWest,
            (false, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthWest,
            (true, true) => Quadrant::SouthEast,
        }
    }

    /// Returns the sub-rectangle covering one quarter of this one.
    pub fn quadrant(&self, q: Quadrant) -> Rect {
        let half = self.size * 0.5;
        let mid = self.center();
        let min = match q {
            Quadrant::NorthWest => self.min,
            Quadrant::NorthEast => Vec2::new(mid.x, self.min.y),
            Quadrant::SouthWest => Vec2::new(self.min.x, mid.y),
            Quadrant::SouthEast => mid,
        };
        Rect { min, size: half }
    }
}

/// Clamps the length of `v` to at most `max_len`, keeping its direction.
///
/// A non-positive `max_len` yields `Vec2::ZERO`.
#[inline]
pub fn clamp_length(v: Vec2, max_len: f32) -> Vec2 {
    if max_len <= 0.0 {
        return Vec2::ZERO;
    }
    v.clamp_length_max(max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_all_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(10.0, 4.0)));
        assert!(r.contains(Vec2::new(5.0, 2.0)));
        assert!(!r.contains(Vec2::new(10.01, 2.0)));
        assert!(!r.contains(Vec2::new(5.0, -0.01)));
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let r = Rect::new(-4.0, -2.0, 8.0, 4.0);
        let nw = r.quadrant(Quadrant::NorthWest);
        let se = r.quadrant(Quadrant::SouthEast);
        assert_eq!(nw, Rect::new(-4.0, -2.0, 4.0, 2.0));
        assert_eq!(se, Rect::new(0.0, 0.0, 4.0, 2.0));
        assert_eq!(r.quadrant(Quadrant::NorthEast).min, Vec2::new(0.0, -2.0));
        assert_eq!(r.quadrant(Quadrant::SouthWest).min, Vec2::new(-4.0, 0.0));
    }

    #[test]
    fn quadrant_of_agrees_with_quadrant_containment() {
        let r = Rect::new(0.0, 0.0, 2.0, 2.0);
        let points = [
            Vec2::new(0.2, 0.3),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.2),
            Vec2::new(0.2, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        for p in points {
            let q = r.quadrant_of(p);
            assert!(r.quadrant(q).contains(p), "{p:?} not inside {q:?}");
        }
    }

    #[test]
    fn clamp_keeps_points_inside() {
        let r = Rect::from_center_size(Vec2::ZERO, Vec2::new(2.0, 2.0));
        let p = r.clamp(Vec2::new(5.0, -7.0));
        assert_eq!(p, Vec2::new(1.0, -1.0));
        assert!(r.contains(p));
    }

    #[test]
    fn clamp_length_preserves_direction() {
        let v = clamp_length(Vec2::new(3.0, 4.0), 1.0);
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x - 0.6).abs() < 1e-6);
        assert_eq!(clamp_length(Vec2::new(0.1, 0.0), 1.0), Vec2::new(0.1, 0.0));
        assert_eq!(clamp_length(Vec2::new(3.0, 4.0), 0.0), Vec2::ZERO);
    }
}

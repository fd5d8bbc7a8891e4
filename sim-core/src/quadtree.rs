//! Barnes-Hut quadtree for approximate repulsion.
//!
//! Cells live in a flat arena; an internal cell stores the id of its first
//! child and the four children occupy consecutive slots in
//! [`Quadrant`] order. Children are always pushed after their parent, so a
//! reverse sweep over the arena is a valid post-order traversal.
//!
//! The tree is rebuilt every tick with [`QuadTree::rebuild`], which clears
//! the arena but keeps its allocation.

use glam::Vec2;

use crate::{
    body::{Body, PointMass, Repulsion},
    error::QuadTreeError,
    geometry::{Quadrant, Rect},
    types::{CellId, NodeId},
};

/// A graph node as seen by the tree: a snapshot of its id, position and mass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadBody {
    pub id: NodeId,
    pub position: Vec2,
    pub mass: f32,
}

impl Body for QuadBody {
    #[inline]
    fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

#[derive(Debug)]
struct Cell {
    region: Rect,
    depth: usize,
    /// Bodies held directly. Always empty for internal cells.
    bodies: Vec<QuadBody>,
    first_child: Option<CellId>,
    mass: f32,
    center: Vec2,
}

impl Cell {
    fn new(region: Rect, depth: usize) -> Self {
        Self {
            region,
            depth,
            bodies: Vec::new(),
            first_child: None,
            mass: 0.0,
            center: region.center(),
        }
    }

    #[inline]
    fn children(&self) -> Option<std::ops::Range<CellId>> {
        self.first_child.map(|first| first..first + 4)
    }
}

#[derive(Debug)]
pub struct QuadTree {
    cells: Vec<Cell>,
    capacity: usize,
    max_depth: usize,
}

impl QuadTree {
    /// Creates an empty tree over `region`.
    ///
    /// A leaf splits once it would hold more than `capacity` bodies. Leaves
    /// at `max_depth` never split, which bounds the recursion when more than
    /// `capacity` bodies share a position.
    pub fn new(region: Rect, capacity: usize, max_depth: usize) -> Self {
        Self {
            cells: vec![Cell::new(region, 0)],
            capacity: capacity.max(1),
            max_depth,
        }
    }

    /// Builds a tree from `bodies` and computes its masses.
    pub fn build(
        region: Rect,
        capacity: usize,
        max_depth: usize,
        bodies: impl IntoIterator<Item = QuadBody>,
    ) -> Result<Self, QuadTreeError> {
        let mut tree = Self::new(region, capacity, max_depth);
        tree.rebuild(region, bodies)?;
        Ok(tree)
    }

    /// Discards the current contents and refills the tree from scratch.
    pub fn rebuild(
        &mut self,
        region: Rect,
        bodies: impl IntoIterator<Item = QuadBody>,
    ) -> Result<(), QuadTreeError> {
        self.cells.clear();
        self.cells.push(Cell::new(region, 0));
        for body in bodies {
            self.insert(body)?;
        }
        self.compute_masses();
        Ok(())
    }

    pub fn region(&self) -> Rect {
        self.cells[0].region
    }

    /// Number of cells in the arena.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Aggregate mass at the root. Valid after [`QuadTree::compute_masses`].
    pub fn total_mass(&self) -> f32 {
        self.cells[0].mass
    }

    pub fn center_of_mass(&self) -> Vec2 {
        self.cells[0].center
    }

    /// Inserts a body, subdividing full leaves on the way down.
    ///
    /// Fails if the body lies outside the root region.
    pub fn insert(&mut self, body: QuadBody) -> Result<(), QuadTreeError> {
        if !self.cells[0].region.contains(body.position) {
            return Err(QuadTreeError::OutOfBounds {
                node: body.id,
                position: body.position,
            });
        }

        let mut id = 0;
        loop {
            if self.cells[id].first_child.is_none() {
                let cell = &self.cells[id];
                if cell.bodies.len() < self.capacity || cell.depth >= self.max_depth {
                    self.cells[id].bodies.push(body);
                    return Ok(());
                }
                self.subdivide(id);
            }
            id = self.child_for(id, body.position);
        }
    }

    /// Splits a leaf into four quadrants and pushes its bodies down one level.
    fn subdivide(&mut self, id: CellId) {
        let first = self.cells.len();
        let region = self.cells[id].region;
        let depth = self.cells[id].depth + 1;
        for q in Quadrant::ALL {
            self.cells.push(Cell::new(region.quadrant(q), depth));
        }

        let bodies = std::mem::take(&mut self.cells[id].bodies);
        self.cells[id].first_child = Some(first);
        for body in bodies {
            let child = first + region.quadrant_of(body.position).index();
            self.cells[child].bodies.push(body);
        }
    }

    #[inline]
    fn child_for(&self, id: CellId, p: Vec2) -> CellId {
        let cell = &self.cells[id];
        match cell.first_child {
            Some(first) => first + cell.region.quadrant_of(p).index(),
            None => id,
        }
    }

    /// Returns the leaf whose path from the root contains `p`, if `p` is
    /// inside the root region.
    pub fn leaf_containing(&self, p: Vec2) -> Option<CellId> {
        if !self.cells[0].region.contains(p) {
            return None;
        }
        let mut id = 0;
        while self.cells[id].first_child.is_some() {
            id = self.child_for(id, p);
        }
        Some(id)
    }

    /// Fills in mass and center-of-mass for every cell, bottom-up.
    ///
    /// Cells without mass keep their region center and are ignored by
    /// their parent, so nothing divides by zero.
    pub fn compute_masses(&mut self) {
        for id in (0..self.cells.len()).rev() {
            let (mass, weighted) = match self.cells[id].children() {
                None => self.cells[id]
                    .bodies
                    .iter()
                    .fold((0.0, Vec2::ZERO), |(m, w), b| (m + b.mass, w + b.position * b.mass)),
                Some(children) => children
                    .map(|c| &self.cells[c])
                    .filter(|c| c.mass > 0.0)
                    .fold((0.0, Vec2::ZERO), |(m, w), c| (m + c.mass, w + c.center * c.mass)),
            };

            let cell = &mut self.cells[id];
            cell.mass = mass;
            cell.center = if mass > 0.0 {
                weighted / mass
            } else {
                cell.region.center()
            };
        }
    }

    /// Approximate net repulsion on `body` from everything in the tree.
    ///
    /// A cell of width `s` whose center of mass is at distance `d` stands in
    /// for all of its bodies when `s / d < theta` and the cell does not
    /// contain `body`. With `theta == 0` every leaf is visited and the result
    /// is the exact pairwise sum. The body itself is skipped by id.
    ///
    /// ### Parameters
    /// - `body` - Query body; it may or may not be stored in the tree.
    /// - `theta` - Accuracy threshold; smaller is more exact.
    /// - `law` - Pairwise repulsion applied to bodies and aggregates alike.
    ///
    /// ### Returns
    /// The summed force on `body`. Empty and massless cells contribute zero.
    pub fn compute_force(&self, body: &QuadBody, theta: f32, law: &Repulsion) -> Vec2 {
        self.force_from(0, body, theta, law)
    }

    fn force_from(&self, id: CellId, body: &QuadBody, theta: f32, law: &Repulsion) -> Vec2 {
        let cell = &self.cells[id];
        let Some(children) = cell.children() else {
            return cell
                .bodies
                .iter()
                .filter(|other| other.id != body.id)
                .map(|other| law.between(body, other))
                .sum();
        };

        if cell.mass <= 0.0 {
            return Vec2::ZERO;
        }

        let d = body.position.distance(cell.center);
        if d > 0.0 && cell.region.width() / d < theta && !cell.region.contains(body.position) {
            let aggregate = PointMass {
                position: cell.center,
                mass: cell.mass,
            };
            return law.between(body, &aggregate);
        }

        children.map(|c| self.force_from(c, body, theta, law)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn region() -> Rect {
        Rect::new(-100.0, -100.0, 200.0, 200.0)
    }

    fn random_bodies(n: usize, seed: u64) -> Vec<QuadBody> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|id| QuadBody {
                id,
                position: Vec2::new(rng.random_range(-90.0..90.0), rng.random_range(-90.0..90.0)),
                mass: rng.random_range(1.0..6.0),
            })
            .collect()
    }

    fn exact_force(bodies: &[QuadBody], target: &QuadBody, law: &Repulsion) -> Vec2 {
        bodies
            .iter()
            .filter(|b| b.id != target.id)
            .map(|b| law.between(target, b))
            .sum()
    }

    #[test]
    fn insert_outside_root_fails() {
        let mut tree = QuadTree::new(region(), 4, 32);
        let body = QuadBody {
            id: 7,
            position: Vec2::new(150.0, 0.0),
            mass: 1.0,
        };
        assert_eq!(
            tree.insert(body),
            Err(QuadTreeError::OutOfBounds {
                node: 7,
                position: body.position
            })
        );
    }

    #[test]
    fn leaf_splits_only_above_capacity() {
        let mut tree = QuadTree::new(region(), 2, 32);
        let bodies = random_bodies(3, 1);
        tree.insert(bodies[0]).unwrap();
        tree.insert(bodies[1]).unwrap();
        assert_eq!(tree.cell_count(), 1);

        tree.insert(bodies[2]).unwrap();
        assert!(tree.cell_count() >= 5);
        assert!(tree.cells[0].bodies.is_empty());
    }

    #[test]
    fn leaves_respect_capacity() {
        let tree = QuadTree::build(region(), 3, 32, random_bodies(300, 2)).unwrap();
        for cell in &tree.cells {
            match cell.first_child {
                Some(_) => assert!(cell.bodies.is_empty()),
                None => assert!(cell.bodies.len() <= 3),
            }
        }
    }

    #[test]
    fn every_body_sits_on_exactly_one_containing_path() {
        let bodies = random_bodies(250, 3);
        let tree = QuadTree::build(region(), 4, 32, bodies.iter().copied()).unwrap();

        for body in &bodies {
            let mut id = 0;
            loop {
                assert!(tree.cells[id].region.contains(body.position));
                match tree.cells[id].first_child {
                    Some(first) => {
                        let child = tree.child_for(id, body.position);
                        assert!((first..first + 4).contains(&child));
                        id = child;
                    }
                    None => break,
                }
            }
            assert_eq!(tree.leaf_containing(body.position), Some(id));
            assert!(tree.cells[id].bodies.iter().any(|b| b.id == body.id));

            let holders = tree
                .cells
                .iter()
                .filter(|c| c.bodies.iter().any(|b| b.id == body.id))
                .count();
            assert_eq!(holders, 1, "body {} stored {holders} times", body.id);
        }
    }

    #[test]
    fn root_mass_equals_sum_of_masses() {
        let bodies = random_bodies(500, 4);
        let tree = QuadTree::build(region(), 4, 32, bodies.iter().copied()).unwrap();

        let mass: f32 = bodies.iter().map(|b| b.mass).sum();
        let weighted: Vec2 = bodies.iter().map(|b| b.position * b.mass).sum();
        assert!((tree.total_mass() - mass).abs() < 1e-4 * mass);
        assert!(tree.center_of_mass().distance(weighted / mass) < 1e-2);
    }

    #[test]
    fn internal_mass_combines_children() {
        let tree = QuadTree::build(region(), 2, 32, random_bodies(64, 5)).unwrap();
        for cell in &tree.cells {
            let Some(children) = cell.children() else {
                continue;
            };
            let mass: f32 = children.clone().map(|c| tree.cells[c].mass).sum();
            assert!((cell.mass - mass).abs() < 1e-3);
            let weighted: Vec2 = children
                .map(|c| tree.cells[c].center * tree.cells[c].mass)
                .sum();
            assert!(cell.center.distance(weighted / mass) < 1e-3);
        }
    }

    #[test]
    fn empty_and_massless_cells_do_not_produce_nan() {
        let bodies = vec![
            QuadBody {
                id: 0,
                position: Vec2::new(-50.0, -50.0),
                mass: 0.0,
            },
            QuadBody {
                id: 1,
                position: Vec2::new(-40.0, -50.0),
                mass: 0.0,
            },
            QuadBody {
                id: 2,
                position: Vec2::new(60.0, 60.0),
                mass: 2.0,
            },
        ];
        let tree = QuadTree::build(region(), 1, 32, bodies.iter().copied()).unwrap();
        assert!(tree.cells.iter().all(|c| c.center.is_finite() && c.mass.is_finite()));
        assert_eq!(tree.total_mass(), 2.0);
        assert_eq!(tree.center_of_mass(), Vec2::new(60.0, 60.0));

        let law = Repulsion::new(10.0, 0.1);
        for b in &bodies {
            assert!(tree.compute_force(b, 0.5, &law).is_finite());
        }
    }

    #[test]
    fn coincident_bodies_stop_at_max_depth() {
        let bodies = (0..10).map(|id| QuadBody {
            id,
            position: Vec2::new(3.0, 3.0),
            mass: 1.0,
        });
        let tree = QuadTree::build(region(), 2, 6, bodies).unwrap();
        let leaf = tree.leaf_containing(Vec2::new(3.0, 3.0)).unwrap();
        assert_eq!(tree.cells[leaf].depth, 6);
        assert_eq!(tree.cells[leaf].bodies.len(), 10);

        let law = Repulsion::new(10.0, 0.1);
        let query = QuadBody {
            id: 0,
            position: Vec2::new(3.0, 3.0),
            mass: 1.0,
        };
        assert_eq!(tree.compute_force(&query, 0.5, &law), Vec2::ZERO);
    }

    #[test]
    fn coarse_theta_never_aggregates_own_cell() {
        let bodies = [
            QuadBody {
                id: 0,
                position: Vec2::new(-95.0, -5.0),
                mass: 1.0,
            },
            QuadBody {
                id: 1,
                position: Vec2::new(-5.0, -95.0),
                mass: 20.0,
            },
            QuadBody {
                id: 2,
                position: Vec2::new(90.0, 90.0),
                mass: 1.0,
            },
        ];
        let tree = QuadTree::build(region(), 1, 32, bodies).unwrap();
        let law = Repulsion::new(10.0, 0.1);

        // Body 0 sits far from the center of mass of its north-west cell,
        // so only the containment check keeps that cell from being lumped.
        let got = tree.compute_force(&bodies[0], 2.0, &law);
        let want = exact_force(&bodies, &bodies[0], &law);
        assert!(got.distance(want) < 1e-4 * want.length(), "got {got:?}, want {want:?}");
    }

    #[test]
    fn theta_zero_matches_exact_sum() {
        let bodies = random_bodies(120, 6);
        let tree = QuadTree::build(region(), 4, 32, bodies.iter().copied()).unwrap();
        let law = Repulsion::new(10.0, 0.1);

        for target in &bodies {
            let exact = exact_force(&bodies, target, &law);
            let approx = tree.compute_force(target, 0.0, &law);
            let tol = 1e-4 * exact.length().max(1.0);
            assert!(approx.distance(exact) < tol, "{approx:?} vs {exact:?}");
        }
    }

    #[test]
    fn error_shrinks_as_theta_goes_to_zero() {
        let bodies = random_bodies(400, 7);
        let tree = QuadTree::build(region(), 4, 32, bodies.iter().copied()).unwrap();
        let law = Repulsion::new(10.0, 0.1);

        let relative_error = |theta: f32| -> f32 {
            let (err, norm) = bodies.iter().fold((0.0, 0.0), |(err, norm), t| {
                let exact = exact_force(&bodies, t, &law);
                let approx = tree.compute_force(t, theta, &law);
                (err + approx.distance(exact), norm + exact.length())
            });
            err / norm
        };

        let coarse = relative_error(1.0);
        let fine = relative_error(0.3);
        let exact = relative_error(0.0);
        assert!(fine <= coarse, "theta 0.3 error {fine} > theta 1.0 error {coarse}");
        assert!(fine < 0.05, "theta 0.3 error {fine}");
        assert!(exact < 1e-4, "theta 0 error {exact}");
    }

    #[test]
    fn rebuild_reuses_the_arena() {
        let mut tree = QuadTree::build(region(), 4, 32, random_bodies(100, 8)).unwrap();
        let first = tree.cell_count();
        tree.rebuild(region(), random_bodies(3, 9)).unwrap();
        assert!(tree.cell_count() < first);
        assert_eq!(tree.cell_count(), 1);
        assert!(tree.cells.capacity() >= first);
    }
}

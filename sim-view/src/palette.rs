//! Per-group node colors.

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seed used for group colors, so a graph always gets the same palette.
pub const PALETTE_SEED: u64 = 123;

/// One random opaque color per group, assigned in first-seen order.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<i64, egui::Color32>,
}

impl Palette {
    pub fn for_groups(groups: impl IntoIterator<Item = i64>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut colors = HashMap::new();
        for group in groups {
            colors.entry(group).or_insert_with(|| {
                egui::Color32::from_rgb(
                    rng.random_range(0..255),
                    rng.random_range(0..255),
                    rng.random_range(0..255),
                )
            });
        }
        Self { colors }
    }

    pub fn color(&self, group: i64) -> egui::Color32 {
        self.colors
            .get(&group)
            .copied()
            .unwrap_or(egui::Color32::GRAY)
    }
}

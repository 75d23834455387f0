//! Obstacle size categories and weighted selection

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Discrete size class of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleCategory {
    Tiny,
    Small,
    Medium,
    Big,
}

impl ObstacleCategory {
    /// Selection walk order
    pub const ALL: [ObstacleCategory; 4] = [
        ObstacleCategory::Tiny,
        ObstacleCategory::Small,
        ObstacleCategory::Medium,
        ObstacleCategory::Big,
    ];

    /// Returned when no category has any weight
    pub const FALLBACK: ObstacleCategory = ObstacleCategory::Small;

    pub fn index(self) -> usize {
        match self {
            ObstacleCategory::Tiny => 0,
            ObstacleCategory::Small => 1,
            ObstacleCategory::Medium => 2,
            ObstacleCategory::Big => 3,
        }
    }
}

/// One value per category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable<T> {
    pub tiny: T,
    pub small: T,
    pub medium: T,
    pub big: T,
}

impl<T: Copy> CategoryTable<T> {
    pub fn get(&self, category: ObstacleCategory) -> T {
        match category {
            ObstacleCategory::Tiny => self.tiny,
            ObstacleCategory::Small => self.small,
            ObstacleCategory::Medium => self.medium,
            ObstacleCategory::Big => self.big,
        }
    }
}

/// Relative spawn chances per category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights(pub CategoryTable<f32>);

impl Default for CategoryWeights {
    fn default() -> Self {
        Self(CategoryTable {
            tiny: 0.40,
            small: 0.30,
            medium: 0.20,
            big: 0.10,
        })
    }
}

impl CategoryWeights {
    pub fn new(tiny: f32, small: f32, medium: f32, big: f32) -> Self {
        Self(CategoryTable {
            tiny,
            small,
            medium,
            big,
        })
    }

    pub fn total(&self) -> f32 {
        ObstacleCategory::ALL
            .iter()
            .map(|&c| self.0.get(c))
            .sum()
    }

    /// Map a roll in `[0, total)` to a category.
    ///
    /// Walks Tiny, Small, Medium, Big in order, subtracting each weight. A
    /// roll at or past the total lands in the last category with weight, so
    /// a zero-weight category is never returned while any weight is positive.
    pub fn pick(&self, roll: f32) -> ObstacleCategory {
        let mut roll = roll;
        let mut last = ObstacleCategory::FALLBACK;
        for category in ObstacleCategory::ALL {
            let weight = self.0.get(category);
            if weight <= 0.0 {
                continue;
            }
            if roll < weight {
                return category;
            }
            roll -= weight;
            last = category;
        }
        last
    }

    /// Draw a category with probability weight / total
    pub fn sample(&self, rng: &mut impl Rng) -> ObstacleCategory {
        let total = self.total();
        if total <= 0.0 {
            return ObstacleCategory::FALLBACK;
        }
        let roll = rng.random_range(0.0..total);
        self.pick(roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_walks_cumulative_buckets() {
        let weights = CategoryWeights::new(0.4, 0.3, 0.2, 0.1);
        assert_eq!(weights.pick(0.35), ObstacleCategory::Tiny);
        assert_eq!(weights.pick(0.55), ObstacleCategory::Small);
        assert_eq!(weights.pick(0.75), ObstacleCategory::Medium);
        assert_eq!(weights.pick(0.95), ObstacleCategory::Big);
    }

    #[test]
    fn test_roll_at_total_skips_zero_weight_big() {
        let weights = CategoryWeights::new(1.0, 2.0, 0.0, 0.0);
        assert_eq!(weights.pick(weights.total()), ObstacleCategory::Small);
        assert_eq!(weights.pick(2.999_999_8), ObstacleCategory::Small);

        let weights = CategoryWeights::new(0.4, 0.3, 0.2, 0.0);
        assert_eq!(weights.pick(0.9), ObstacleCategory::Medium);
        assert_eq!(weights.pick(5.0), ObstacleCategory::Medium);
    }

    #[test]
    fn test_zero_weights_fall_back_to_small() {
        let weights = CategoryWeights::new(0.0, 0.0, 0.0, 0.0);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(weights.sample(&mut rng), ObstacleCategory::Small);
        }
    }

    #[test]
    fn test_single_weight_always_wins() {
        let weights = CategoryWeights::new(0.0, 0.0, 0.0, 3.0);
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(weights.sample(&mut rng), ObstacleCategory::Big);
        }
    }

    #[test]
    fn test_distribution_matches_weights() {
        let weights = CategoryWeights::new(0.4, 0.3, 0.2, 0.1);
        let mut rng = Pcg32::seed_from_u64(0xA57E_201D);
        let samples = 100_000;
        let mut counts = [0u32; 4];
        for _ in 0..samples {
            counts[weights.sample(&mut rng).index()] += 1;
        }
        for category in ObstacleCategory::ALL {
            let observed = counts[category.index()] as f32 / samples as f32;
            let expected = weights.0.get(category) / weights.total();
            assert!(
                (observed - expected).abs() < 0.01,
                "{category:?}: observed {observed}, expected {expected}"
            );
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn unnormalized_weights_keep_proportions(
            w in prop::array::uniform4(0.0f32..5.0),
            seed in any::<u64>(),
        ) {
            let weights = CategoryWeights::new(w[0], w[1], w[2], w[3]);
            prop_assume!(weights.total() > 0.5);
            let mut rng = Pcg32::seed_from_u64(seed);
            let samples = 20_000;
            let mut counts = [0u32; 4];
            for _ in 0..samples {
                counts[weights.sample(&mut rng).index()] += 1;
            }
            for category in ObstacleCategory::ALL {
                let observed = counts[category.index()] as f32 / samples as f32;
                let expected = weights.0.get(category) / weights.total();
                prop_assert!((observed - expected).abs() < 0.03);
            }
        }
    }
}

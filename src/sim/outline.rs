//! Obstacle outlines, visual variants and collision shapes
//!
//! Outlines are closed polygon paths in the variant's local, pre-scale space
//! (unit-ish rocks centred on the origin). The transform applies scale; a
//! collision shape never bakes it in.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::category::{CategoryTable, ObstacleCategory};
use crate::unit_from_angle;

/// Nominal radius of a generated rock before scaling
pub const BASE_ROCK_RADIUS: f32 = 0.5;

/// Identifies a visual variant inside a [`VariantCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId {
    pub category: ObstacleCategory,
    pub index: u16,
}

/// One or more closed polygon paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub paths: Vec<Vec<Vec2>>,
}

impl Outline {
    pub fn new(paths: Vec<Vec<Vec2>>) -> Self {
        Self { paths }
    }

    /// Regular polygon, mostly for tests and placeholders
    pub fn regular(sides: usize, radius: f32) -> Self {
        let sides = sides.max(3);
        let step = std::f32::consts::TAU / sides as f32;
        let path = (0..sides)
            .map(|i| unit_from_angle(i as f32 * step) * radius)
            .collect();
        Self::new(vec![path])
    }

    /// Jagged rock: vertices around a circle with random radial dents
    pub fn rock(rng: &mut impl Rng, vertices: usize, jaggedness: f32) -> Self {
        let vertices = vertices.max(5);
        let jaggedness = jaggedness.clamp(0.0, 0.9);
        let step = std::f32::consts::TAU / vertices as f32;
        let path = (0..vertices)
            .map(|i| {
                let theta = i as f32 * step + rng.random_range(-0.3..0.3) * step;
                let r = BASE_ROCK_RADIUS * (1.0 - jaggedness * rng.random::<f32>());
                unit_from_angle(theta) * r
            })
            .collect();
        Self::new(vec![path])
    }

    /// Largest vertex distance from the local origin
    pub fn bounding_radius(&self) -> f32 {
        self.paths
            .iter()
            .flatten()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }
}

/// A displayable variant and the physical outline traced from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub outline: Outline,
}

/// Variant pools per category; obstacles only hold `VariantId`s into it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantCatalog {
    pools: CategoryTable<Vec<Variant>>,
}

impl VariantCatalog {
    pub fn empty() -> Self {
        Self {
            pools: CategoryTable {
                tiny: Vec::new(),
                small: Vec::new(),
                medium: Vec::new(),
                big: Vec::new(),
            },
        }
    }

    /// Generate `per_category` rocks for every category.
    ///
    /// Bigger categories get more vertices so they read as rougher shapes.
    pub fn procedural(rng: &mut impl Rng, per_category: usize) -> Self {
        let mut catalog = Self::empty();
        for category in ObstacleCategory::ALL {
            let vertices = 7 + category.index() * 2;
            for _ in 0..per_category {
                let outline = Outline::rock(rng, vertices, 0.35);
                catalog.push(category, outline);
            }
        }
        catalog
    }

    /// Append a variant to a pool and return its id
    pub fn push(&mut self, category: ObstacleCategory, outline: Outline) -> VariantId {
        let pool = self.pool_mut(category);
        let id = VariantId {
            category,
            index: pool.len() as u16,
        };
        pool.push(Variant { id, outline });
        id
    }

    pub fn pool(&self, category: ObstacleCategory) -> &[Variant] {
        match category {
            ObstacleCategory::Tiny => &self.pools.tiny,
            ObstacleCategory::Small => &self.pools.small,
            ObstacleCategory::Medium => &self.pools.medium,
            ObstacleCategory::Big => &self.pools.big,
        }
    }

    fn pool_mut(&mut self, category: ObstacleCategory) -> &mut Vec<Variant> {
        match category {
            ObstacleCategory::Tiny => &mut self.pools.tiny,
            ObstacleCategory::Small => &mut self.pools.small,
            ObstacleCategory::Medium => &mut self.pools.medium,
            ObstacleCategory::Big => &mut self.pools.big,
        }
    }

    pub fn get(&self, id: VariantId) -> Option<&Variant> {
        self.pool(id.category).get(id.index as usize)
    }

    /// Uniformly random variant of a category, `None` for an empty pool
    pub fn choose(&self, category: ObstacleCategory, rng: &mut impl Rng) -> Option<VariantId> {
        let pool = self.pool(category);
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.random_range(0..pool.len())].id)
    }
}

/// Collision geometry traced from the currently displayed variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    pub source: VariantId,
    /// Local, pre-scale paths
    pub paths: Vec<Vec<Vec2>>,
}

impl CollisionShape {
    pub fn from_variant(variant: &Variant) -> Self {
        Self {
            source: variant.id,
            paths: variant.outline.paths.clone(),
        }
    }

    pub fn bounding_radius(&self) -> f32 {
        self.paths
            .iter()
            .flatten()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }
}

//! Asteroid obstacles
//!
//! An obstacle configures itself once on activation: weighted category,
//! variant and scale, collision shape, then a one-shot launch impulse and
//! spin. Afterwards it only reacts to wall contacts with a timed boost.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Deferred;
use super::category::ObstacleCategory;
use super::effects::EffectPool;
use super::events::{EffectKind, GameEvent};
use super::outline::{CollisionShape, VariantCatalog, VariantId};
use super::physics::{BodyHandle, Contact, Physics, SurfaceTag};
use super::timer::{DeferredQueue, TimerId};
use crate::settings::ObstacleTuning;
use crate::unit_from_angle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

/// Wall boost sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostState {
    Idle,
    /// Velocity is multiplied; `timer` restores it
    Boosting { timer: TimerId },
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    id: ObstacleId,
    category: Option<ObstacleCategory>,
    scale: f32,
    variant: Option<VariantId>,
    shape: Option<CollisionShape>,
    body: Option<BodyHandle>,
    has_sprite: bool,
    boost: BoostState,
    activated: bool,
}

impl Obstacle {
    /// Build an obstacle around its collaborators. Either may be missing, in
    /// which case the matching part of setup is skipped.
    pub fn new(id: ObstacleId, body: Option<BodyHandle>, has_sprite: bool) -> Self {
        Self {
            id,
            category: None,
            scale: 1.0,
            variant: None,
            shape: None,
            body,
            has_sprite,
            boost: BoostState::Idle,
            activated: false,
        }
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    pub fn category(&self) -> Option<ObstacleCategory> {
        self.category
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn variant(&self) -> Option<VariantId> {
        self.variant
    }

    pub fn shape(&self) -> Option<&CollisionShape> {
        self.shape.as_ref()
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn boost_state(&self) -> BoostState {
        self.boost
    }

    pub fn is_boosting(&self) -> bool {
        matches!(self.boost, BoostState::Boosting { .. })
    }

    /// One-time setup. Does nothing without a body or when already active.
    pub fn activate(
        &mut self,
        rng: &mut impl Rng,
        catalog: &VariantCatalog,
        tuning: &ObstacleTuning,
        physics: &mut impl Physics,
    ) {
        if self.activated {
            return;
        }
        self.activated = true;

        if self.body.is_none() {
            log::warn!("Obstacle {:?} has no body, staying inert", self.id);
            return;
        }

        let category = tuning.weights.sample(rng);
        self.category = Some(category);
        self.apply_size_and_visual(category, rng, catalog, tuning, physics);
        self.apply_initial_impulse(rng, tuning, physics);

        log::debug!(
            "Obstacle {:?}: {:?} scale {} variant {:?}",
            self.id,
            category,
            self.scale,
            self.variant
        );
    }

    /// Pick a variant, apply the category scale, then rebuild the collider.
    ///
    /// The collider is rebuilt last: its paths live in the variant's pre-scale
    /// space and the scale is handed to physics alongside them.
    pub fn apply_size_and_visual(
        &mut self,
        category: ObstacleCategory,
        rng: &mut impl Rng,
        catalog: &VariantCatalog,
        tuning: &ObstacleTuning,
        physics: &mut impl Physics,
    ) {
        if !self.has_sprite {
            return;
        }

        let variant = catalog.choose(category, rng);
        self.scale = tuning.scales.get(category);

        match variant {
            Some(id) => {
                self.apply_variant(id, catalog, physics);
            }
            None => log::debug!("No {category:?} variants, keeping default look"),
        }
    }

    /// Display `id` and regenerate the collision shape from it.
    ///
    /// Returns false if the catalog does not know the variant.
    pub fn apply_variant(
        &mut self,
        id: VariantId,
        catalog: &VariantCatalog,
        physics: &mut impl Physics,
    ) -> bool {
        let Some(variant) = catalog.get(id) else {
            return false;
        };
        self.variant = Some(id);
        let shape = CollisionShape::from_variant(variant);
        if let Some(body) = self.body {
            physics.set_collider(body, &shape.paths, self.scale);
        }
        self.shape = Some(shape);
        true
    }

    /// Launch in a random direction; smaller rocks go proportionally faster
    pub fn apply_initial_impulse(
        &mut self,
        rng: &mut impl Rng,
        tuning: &ObstacleTuning,
        physics: &mut impl Physics,
    ) {
        let Some(body) = self.body else {
            return;
        };

        let base = if tuning.max_speed > tuning.min_speed {
            rng.random_range(tuning.min_speed..=tuning.max_speed)
        } else {
            tuning.min_speed
        };
        let speed = base / self.scale;
        let direction = unit_from_angle(rng.random_range(0.0..std::f32::consts::TAU));
        physics.apply_impulse(body, direction * speed);

        let spin = if tuning.max_spin > 0.0 {
            rng.random_range(-tuning.max_spin..=tuning.max_spin)
        } else {
            0.0
        };
        physics.apply_angular_impulse(body, spin);
    }

    /// React to a contact. Only a wall hit while idle starts a boost.
    ///
    /// Returns true when a boost started.
    #[allow(clippy::too_many_arguments)]
    pub fn on_collision(
        &mut self,
        contact: &Contact,
        now: f64,
        tuning: &ObstacleTuning,
        physics: &mut impl Physics,
        timers: &mut DeferredQueue<Deferred>,
        effects: &mut EffectPool,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if contact.surface != SurfaceTag::Wall || self.is_boosting() {
            return false;
        }
        let Some(body) = self.body else {
            return false;
        };

        let vel = physics.linear_velocity(body);
        physics.set_linear_velocity(body, vel * tuning.boost_multiplier);

        let timer = timers.schedule(
            now + tuning.boost_duration as f64,
            Deferred::EndBoost(self.id),
        );
        self.boost = BoostState::Boosting { timer };

        effects.spawn(
            EffectKind::Bounce,
            contact.point,
            0.0,
            tuning.bounce_effect_lifetime,
        );
        events.push(GameEvent::EffectSpawned {
            kind: EffectKind::Bounce,
            pos: contact.point,
            rotation: 0.0,
        });
        events.push(GameEvent::ObstacleBoosted(self.id));
        true
    }

    /// Undo the boost by dividing the multiplier back out.
    ///
    /// Anything that changed the velocity during the boost (another bounce,
    /// drag) is scaled down too; the pre-boost vector is not restored exactly.
    pub fn end_boost(
        &mut self,
        tuning: &ObstacleTuning,
        physics: &mut impl Physics,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.is_boosting() {
            return;
        }
        self.boost = BoostState::Idle;
        if let Some(body) = self.body {
            let vel = physics.linear_velocity(body);
            physics.set_linear_velocity(body, vel / tuning.boost_multiplier);
        }
        events.push(GameEvent::BoostEnded(self.id));
    }

    /// Drop a pending boost expiry; call before the obstacle goes away
    pub fn cancel_boost(&mut self, timers: &mut DeferredQueue<Deferred>) {
        if let BoostState::Boosting { timer } = self.boost {
            timers.cancel(timer);
            self.boost = BoostState::Idle;
        }
    }

    /// Position of the body, if there is one
    pub fn position(&self, physics: &impl Physics) -> Option<Vec2> {
        self.body.map(|b| physics.position(b))
    }
}

//! The rocket: thrust, heading, survival score and the game-over latch

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::EffectPool;
use super::events::{EffectKind, GameEvent, SoundCue};
use super::input::InputSample;
use super::physics::{BodyHandle, Contact, Physics};
use crate::highscore::{self, ScoreStore};
use crate::settings::PlayerTuning;
use crate::{clamp_speed, facing_rotation};

/// Alive until the first contact, then dead for good
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Outcome of the Alive -> Dead transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub score: u64,
    pub best: u64,
    pub new_best: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    body: Option<BodyHandle>,
    tuning: PlayerTuning,
    life: LifeState,
    /// Seconds alive; f64 so long runs keep accruing
    survival_time: f64,
    best_score: u64,
    heading: Vec2,
    flame: bool,
    visible: bool,
}

impl PlayerController {
    /// Create a live rocket, reading the persisted best score from `store`
    pub fn new(body: Option<BodyHandle>, tuning: PlayerTuning, store: &impl ScoreStore) -> Self {
        Self {
            body,
            tuning,
            life: LifeState::Alive,
            survival_time: 0.0,
            best_score: highscore::best_score(store),
            heading: Vec2::Y,
            flame: false,
            visible: true,
        }
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn survival_time(&self) -> f64 {
        self.survival_time
    }

    /// Survival time times the score rate, floored
    pub fn score(&self) -> u64 {
        (self.survival_time * self.tuning.score_per_second as f64)
            .floor()
            .max(0.0) as u64
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    /// Last direction the rocket was steered toward
    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    pub fn flame_on(&self) -> bool {
        self.flame
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self, physics: &impl Physics) -> Vec2 {
        self.body.map_or(Vec2::ZERO, |b| physics.position(b))
    }

    /// Per-frame control. No-op once dead.
    pub fn update(
        &mut self,
        dt: f32,
        sample: &InputSample,
        physics: &mut impl Physics,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.is_alive() {
            return;
        }
        self.survival_time += dt.max(0.0) as f64;

        if let Some(dir) = sample.heading.direction() {
            self.heading = dir;
        }

        if sample.thrust.held {
            if let Some(body) = self.body {
                physics.set_rotation(body, facing_rotation(self.heading));
                physics.apply_impulse(body, self.heading * self.tuning.thrust_force * dt);
                let vel = physics.linear_velocity(body);
                physics.set_linear_velocity(body, clamp_speed(vel, self.tuning.max_speed));
            }
        }

        // Thrust cue lasts only while held
        if sample.thrust.pressed {
            self.flame = true;
            events.push(GameEvent::Flame(true));
            events.push(GameEvent::PlaySound(SoundCue::Thrust));
        } else if sample.thrust.released {
            self.flame = false;
            events.push(GameEvent::Flame(false));
            events.push(GameEvent::StopSound(SoundCue::Thrust));
        }
    }

    /// Any contact while alive ends the run. Returns `None` once dead.
    pub fn on_collision(
        &mut self,
        _contact: &Contact,
        physics: &mut impl Physics,
        store: &mut impl ScoreStore,
        effects: &mut EffectPool,
        events: &mut Vec<GameEvent>,
    ) -> Option<GameOverReport> {
        if !self.is_alive() {
            return None;
        }
        self.life = LifeState::Dead;

        events.push(GameEvent::StopSound(SoundCue::Thrust));

        physics.set_boundaries_enabled(false);
        events.push(GameEvent::BoundariesDisabled);

        let score = self.score();
        let new_best = highscore::record_best(store, score);
        if new_best {
            self.best_score = score;
        }

        events.push(GameEvent::PlaySound(SoundCue::Explosion));

        let (pos, rotation) = match self.body {
            Some(body) => (physics.position(body), physics.rotation(body)),
            None => (Vec2::ZERO, 0.0),
        };
        effects.spawn(
            EffectKind::Explosion,
            pos,
            rotation,
            self.tuning.explosion_effect_lifetime,
        );
        events.push(GameEvent::EffectSpawned {
            kind: EffectKind::Explosion,
            pos,
            rotation,
        });

        events.push(GameEvent::RestartAvailable);

        if let Some(body) = self.body {
            physics.set_body_enabled(body, false);
        }
        self.visible = false;
        if self.flame {
            self.flame = false;
            events.push(GameEvent::Flame(false));
        }

        let report = GameOverReport {
            score,
            best: self.best_score,
            new_best,
        };
        events.push(GameEvent::GameOver {
            score: report.score,
            best: report.best,
            new_best: report.new_best,
        });
        log::info!(
            "Game over: score {} (best {}{})",
            score,
            self.best_score,
            if new_best { ", new record" } else { "" }
        );
        Some(report)
    }

    /// Seconds the wreck lingers before removal
    pub fn removal_delay(&self) -> f32 {
        self.tuning.removal_delay
    }
}

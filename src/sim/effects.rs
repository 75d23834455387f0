//! Short-lived visual effects that expire on their own

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::EffectKind;

/// An effect instance waiting to expire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransientEffect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub rotation: f32,
    /// Seconds of real time left
    pub remaining: f32,
}

/// Live effects, aged by real time
#[derive(Debug, Clone, Default)]
pub struct EffectPool {
    effects: Vec<TransientEffect>,
}

impl EffectPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, kind: EffectKind, pos: Vec2, rotation: f32, lifetime: f32) {
        if lifetime <= 0.0 {
            return;
        }
        self.effects.push(TransientEffect {
            kind,
            pos,
            rotation,
            remaining: lifetime,
        });
    }

    /// Age effects and drop the expired ones
    pub fn tick(&mut self, real_dt: f32) {
        let real_dt = real_dt.max(0.0);
        for effect in &mut self.effects {
            effect.remaining -= real_dt;
        }
        self.effects.retain(|e| e.remaining > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransientEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

//! One-shot notifications for presentation layers (audio, effects, UI)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::ObstacleId;

/// Sound clips the core asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Short engine burst on thrust press, stopped on release
    Thrust,
    /// Rocket destroyed
    Explosion,
}

impl SoundCue {
    /// Cues that keep playing until a matching `StopSound`; the rest play
    /// out on their own
    pub fn is_sustained(self) -> bool {
        matches!(self, SoundCue::Thrust)
    }
}

/// Transient visual effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Obstacle hit a wall
    Bounce,
    /// Rocket destroyed
    Explosion,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlaySound(SoundCue),
    StopSound(SoundCue),
    /// Rocket flame visibility changed
    Flame(bool),
    EffectSpawned {
        kind: EffectKind,
        pos: Vec2,
        rotation: f32,
    },
    ObstacleBoosted(ObstacleId),
    BoostEnded(ObstacleId),
    /// Arena walls stopped constraining bodies
    BoundariesDisabled,
    GameOver {
        score: u64,
        best: u64,
        new_best: bool,
    },
    /// Restart control should be shown
    RestartAvailable,
    /// Rocket wreck removed from the scene
    PlayerRemoved,
}

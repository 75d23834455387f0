//! Simulation core
//!
//! All gameplay logic lives here. This module has no rendering or platform
//! dependencies:
//! - Physics is reached only through the [`Physics`] port
//! - Randomness comes from a seeded RNG
//! - Timed actions run off an explicit real-time clock
//! - Presentation consumes [`GameEvent`]s

pub mod arena;
pub mod category;
pub mod effects;
pub mod events;
pub mod input;
pub mod obstacle;
pub mod outline;
pub mod physics;
pub mod player;
pub mod timer;

pub use arena::{Arena, Deferred};
pub use category::{CategoryTable, CategoryWeights, ObstacleCategory};
pub use effects::{EffectPool, TransientEffect};
pub use events::{EffectKind, GameEvent, SoundCue};
pub use input::{ButtonState, DeviceSnapshot, GamepadState, Heading, InputSample, PointerState};
pub use obstacle::{BoostState, Obstacle, ObstacleId};
pub use outline::{CollisionShape, Outline, Variant, VariantCatalog, VariantId};
pub use physics::{BodyDesc, BodyHandle, Contact, Physics, SimplePhysics, SurfaceTag};
pub use player::{GameOverReport, LifeState, PlayerController};
pub use timer::{DeferredQueue, TimerId};

//! Input aggregation
//!
//! Raw device state is folded once per frame into an [`InputSample`] that the
//! player controller consumes. Missing devices are simply `None`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Press state of a button for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    /// Currently down
    pub held: bool,
    /// Went down this frame
    pub pressed: bool,
    /// Went up this frame
    pub released: bool,
}

impl ButtonState {
    pub const fn idle() -> Self {
        Self {
            held: false,
            pressed: false,
            released: false,
        }
    }

    pub const fn press() -> Self {
        Self {
            held: true,
            pressed: true,
            released: false,
        }
    }

    pub const fn hold() -> Self {
        Self {
            held: true,
            pressed: false,
            released: false,
        }
    }

    pub const fn release() -> Self {
        Self {
            held: false,
            pressed: false,
            released: true,
        }
    }

    /// Either button counts
    pub fn merge(self, other: ButtonState) -> Self {
        Self {
            held: self.held || other.held,
            pressed: self.pressed || other.pressed,
            released: self.released || other.released,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadState {
    /// Left stick, each axis in [-1, 1]
    pub stick: Vec2,
    /// Bottom face button
    pub south: ButtonState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    /// Pointer projected into world space
    pub world_pos: Vec2,
    pub primary: ButtonState,
}

/// Raw device readings for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub gamepad: Option<GamepadState>,
    pub pointer: Option<PointerState>,
}

/// Where the rocket should face, ranked by device availability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Heading {
    /// Normalized stick direction
    Stick(Vec2),
    /// Normalized direction from the rocket to the pointer
    Pointer(Vec2),
    /// No usable device; keep the previous heading
    Hold,
}

impl Heading {
    pub fn direction(&self) -> Option<Vec2> {
        match *self {
            Heading::Stick(dir) | Heading::Pointer(dir) => Some(dir),
            Heading::Hold => None,
        }
    }
}

/// Resolved per-frame input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    pub heading: Heading,
    pub thrust: ButtonState,
}

impl Default for InputSample {
    fn default() -> Self {
        Self {
            heading: Heading::Hold,
            thrust: ButtonState::idle(),
        }
    }
}

impl InputSample {
    /// Fold device readings into a sample.
    ///
    /// A stick above the deadzone beats the pointer; the pointer beats
    /// nothing at all.
    pub fn resolve(devices: &DeviceSnapshot, player_pos: Vec2, deadzone: f32) -> Self {
        let stick = devices
            .gamepad
            .map(|pad| pad.stick)
            .filter(|stick| stick.length() > deadzone);

        let heading = if let Some(stick) = stick {
            Heading::Stick(stick.normalize())
        } else if let Some(dir) = devices
            .pointer
            .map(|p| (p.world_pos - player_pos).normalize_or_zero())
            .filter(|dir| *dir != Vec2::ZERO)
        {
            Heading::Pointer(dir)
        } else {
            Heading::Hold
        };

        let pointer_button = devices.pointer.map_or(ButtonState::idle(), |p| p.primary);
        let pad_button = devices.gamepad.map_or(ButtonState::idle(), |g| g.south);

        Self {
            heading,
            thrust: pointer_button.merge(pad_button),
        }
    }
}

//! Host environment abstraction: where raw controller frames come from.

use super::frame::RawGamepad;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named haptic effect types a host may play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HapticKind {
    /// Strong and weak motors driven together
    #[default]
    DualRumble,
}

impl HapticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HapticKind::DualRumble => "dual-rumble",
        }
    }
}

/// A named rumble effect with its motor parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HapticEffect {
    #[serde(default)]
    pub kind: HapticKind,
    pub duration_ms: u32,
    /// Low-frequency motor, `0.0..=1.0`
    pub strong_magnitude: f32,
    /// High-frequency motor, `0.0..=1.0`
    pub weak_magnitude: f32,
}

impl Default for HapticEffect {
    fn default() -> Self {
        Self {
            kind: HapticKind::DualRumble,
            duration_ms: 200,
            strong_magnitude: 1.0,
            weak_magnitude: 1.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum HapticError {
    #[error("controller {0} is not connected")]
    NotConnected(usize),

    #[error("controller {0} has no haptic actuator")]
    Unsupported(usize),

    #[error("haptic playback failed: {0}")]
    Playback(String),
}

/// Source of controller state, polled once per tick.
pub trait GamepadHost {
    /// Whether the host can enumerate gamepads at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Enumerate controller slots. Disconnected slots are `None`.
    fn poll(&mut self) -> Vec<Option<RawGamepad>>;

    /// Play a rumble effect. Hosts without actuators keep the default.
    fn vibrate(&mut self, controller_index: usize, _effect: HapticEffect) -> Result<(), HapticError> {
        Err(HapticError::Unsupported(controller_index))
    }
}

/// Host driven directly by the caller; each `poll` returns the queued slots.
///
/// Used by tests and by embedders that already hold raw frames.
#[derive(Debug, Default)]
pub struct StaticHost {
    pub supported: bool,
    pub slots: Vec<Option<RawGamepad>>,
}

impl StaticHost {
    pub fn new(slots: Vec<Option<RawGamepad>>) -> Self {
        Self {
            supported: true,
            slots,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            slots: Vec::new(),
        }
    }
}

impl GamepadHost for StaticHost {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn poll(&mut self) -> Vec<Option<RawGamepad>> {
        self.slots.clone()
    }
}

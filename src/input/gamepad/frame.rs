//! Per-frame controller input, as read from a host and after validation.
//!
//! Hosts hand over [`RawGamepad`] values whose collection fields are optional,
//! matching what loosely-typed device objects actually look like. The sampler
//! only ever consumes a [`GamepadFrame`], which is obtained through
//! `TryFrom<RawGamepad>` and rejects anything it cannot trust.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One button as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct RawButton {
    pub pressed: bool,
    /// Analog value in `[0, 1]`; digital buttons report 0 or 1.
    #[serde(default)]
    pub value: Option<f64>,
}

impl RawButton {
    pub fn digital(pressed: bool) -> Self {
        Self {
            pressed,
            value: Some(if pressed { 1.0 } else { 0.0 }),
        }
    }

    pub fn analog(value: f64, pressed: bool) -> Self {
        Self {
            pressed,
            value: Some(value),
        }
    }
}

/// A controller slot entry exactly as the host exposes it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawGamepad {
    pub index: usize,
    #[serde(default = "default_connected")]
    pub connected: bool,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub buttons: Option<Vec<RawButton>>,
    #[serde(default)]
    pub axes: Option<Vec<f64>>,
    /// Device-reported monotonic timestamp (ms)
    #[serde(default)]
    pub timestamp: f64,
}

fn default_connected() -> bool {
    true
}

/// Reasons a raw controller entry is skipped for a frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("controller {index} reported no axes")]
    MissingAxes { index: usize },

    #[error("controller {index} reported no buttons")]
    MissingButtons { index: usize },

    #[error("controller {index} axis {axis} is not a finite number")]
    NonFiniteAxis { index: usize, axis: usize },

    #[error("controller {index} button {button} has a non-finite analog value")]
    NonFiniteButtonValue { index: usize, button: usize },
}

/// Validated input for one connected controller in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadFrame {
    pub index: usize,
    pub name: String,
    pub pressed: Vec<bool>,
    /// Analog button values clamped to `[0, 1]`
    pub button_values: Vec<f64>,
    pub axes: Vec<f64>,
    pub timestamp: f64,
}

impl TryFrom<RawGamepad> for GamepadFrame {
    type Error = FrameError;

    fn try_from(raw: RawGamepad) -> Result<Self, Self::Error> {
        let index = raw.index;
        let axes = raw.axes.ok_or(FrameError::MissingAxes { index })?;
        let buttons = raw.buttons.ok_or(FrameError::MissingButtons { index })?;

        if let Some(axis) = axes.iter().position(|v| !v.is_finite()) {
            return Err(FrameError::NonFiniteAxis { index, axis });
        }

        let mut pressed = Vec::with_capacity(buttons.len());
        let mut button_values = Vec::with_capacity(buttons.len());
        for (button, b) in buttons.iter().enumerate() {
            let value = match b.value {
                Some(v) if !v.is_finite() => {
                    return Err(FrameError::NonFiniteButtonValue { index, button })
                },
                Some(v) => v.clamp(0.0, 1.0),
                None if b.pressed => 1.0,
                None => 0.0,
            };
            pressed.push(b.pressed);
            button_values.push(value);
        }

        Ok(Self {
            index,
            name: raw.id,
            pressed,
            button_values,
            axes,
            timestamp: if raw.timestamp.is_finite() { raw.timestamp } else { 0.0 },
        })
    }
}

//! Live host backed by GilRs
//!
//! Each gilrs gamepad is presented in the "standard" layout that browsers
//! expose: 17 buttons in a fixed order and four stick axes, with both Y axes
//! inverted so that pushing a stick down reads positive. Triggers are analog
//! buttons 6 and 7, which the sampler turns into trigger values.

use super::frame::{RawButton, RawGamepad};
use super::host::{GamepadHost, HapticEffect, HapticError, HapticKind};
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Button order of the standard layout
pub const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// Axis order of the standard layout, with Y inversion flags
const STANDARD_AXES: [(Axis, bool); 4] = [
    (Axis::LeftStickX, false),
    (Axis::LeftStickY, true),
    (Axis::RightStickX, false),
    (Axis::RightStickY, true),
];

/// Short label for a standard-layout button index
pub fn standard_button_label(index: usize) -> &'static str {
    const LABELS: [&str; 17] = [
        "A", "B", "X", "Y", "LB", "RB", "LT", "RT", "Back", "Start", "L3", "R3", "D-Up",
        "D-Down", "D-Left", "D-Right", "Home",
    ];
    LABELS.get(index).copied().unwrap_or("?")
}

/// GilRs-based host. Not `Send` on every platform: keep it on one thread.
pub struct GilrsHost {
    gilrs: Gilrs,
    origin: Instant,
    /// Rumble effects kept alive until they finish playing
    active_effects: Vec<(Instant, Effect)>,
}

impl GilrsHost {
    pub fn new() -> anyhow::Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow::anyhow!("Failed to initialize GilRs: {}", e))?;
        info!("GilRs initialized");
        Ok(Self {
            gilrs,
            origin: Instant::now(),
            active_effects: Vec::new(),
        })
    }

    /// Drain pending events so gamepad state is current, logging hot-plug changes.
    pub fn pump_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    let name = self.gilrs.gamepad(id).name().to_string();
                    info!("🔌 Gamepad connected: {} (index {})", name, usize::from(id));
                },
                EventType::Disconnected => {
                    info!("🔌 Gamepad disconnected (index {})", usize::from(id));
                },
                _ => {},
            }
        }
    }

    /// Read one gamepad into the loose host shape
    pub fn read_gamepad(&self, id: GamepadId, gamepad: &Gamepad<'_>) -> RawGamepad {
        let buttons = STANDARD_BUTTONS
            .iter()
            .map(|&button| {
                let value = gamepad
                    .button_data(button)
                    .map(|data| data.value() as f64)
                    .unwrap_or(0.0);
                RawButton::analog(value, gamepad.is_pressed(button))
            })
            .collect();

        let axes = STANDARD_AXES
            .iter()
            .map(|&(axis, invert)| {
                let value = gamepad.value(axis) as f64;
                if invert { -value } else { value }
            })
            .collect();

        RawGamepad {
            index: usize::from(id),
            connected: gamepad.is_connected(),
            id: gamepad.name().to_string(),
            buttons: Some(buttons),
            axes: Some(axes),
            timestamp: self.origin.elapsed().as_secs_f64() * 1000.0,
        }
    }

    pub fn gilrs(&self) -> &Gilrs {
        &self.gilrs
    }

    fn prune_effects(&mut self) {
        let now = Instant::now();
        self.active_effects.retain(|(until, _)| *until > now);
    }

    fn find_id(&self, controller_index: usize) -> Option<GamepadId> {
        self.gilrs
            .gamepads()
            .find(|(id, gp)| usize::from(*id) == controller_index && gp.is_connected())
            .map(|(id, _)| id)
    }
}

impl GamepadHost for GilrsHost {
    fn poll(&mut self) -> Vec<Option<RawGamepad>> {
        self.pump_events();
        self.prune_effects();

        let mut slots: Vec<Option<RawGamepad>> = Vec::new();
        for (id, gamepad) in self.gilrs.gamepads() {
            if !gamepad.is_connected() {
                continue;
            }
            let raw = self.read_gamepad(id, &gamepad);
            let index = raw.index;
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            slots[index] = Some(raw);
        }
        slots
    }

    fn vibrate(&mut self, controller_index: usize, effect: HapticEffect) -> Result<(), HapticError> {
        let id = self
            .find_id(controller_index)
            .ok_or(HapticError::NotConnected(controller_index))?;

        if !self.gilrs.gamepad(id).is_ff_supported() {
            return Err(HapticError::Unsupported(controller_index));
        }

        let play_for = Ticks::from_ms(effect.duration_ms);
        let motor = |kind| BaseEffect {
            kind,
            scheduling: Replay {
                play_for,
                ..Default::default()
            },
            envelope: Default::default(),
        };

        let mut builder = EffectBuilder::new();
        match effect.kind {
            HapticKind::DualRumble => {
                builder
                    .add_effect(motor(BaseEffectType::Strong {
                        magnitude: to_magnitude(effect.strong_magnitude),
                    }))
                    .add_effect(motor(BaseEffectType::Weak {
                        magnitude: to_magnitude(effect.weak_magnitude),
                    }));
            },
        }

        let ff = builder
            .gamepads(&[id])
            .finish(&mut self.gilrs)
            .map_err(|e| HapticError::Playback(e.to_string()))?;

        ff.play().map_err(|e| HapticError::Playback(e.to_string()))?;
        debug!(
            "Playing {} on controller {} for {} ms",
            effect.kind.as_str(),
            controller_index,
            effect.duration_ms
        );

        let until = Instant::now() + Duration::from_millis(effect.duration_ms as u64);
        self.active_effects.push((until, ff));
        Ok(())
    }
}

fn to_magnitude(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * u16::MAX as f32) as u16
}

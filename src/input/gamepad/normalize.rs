//! Shared normalization functions for gamepad axis and trigger values.
//!
//! Every axis value read from a host goes through [`apply_deadzone`] before it
//! reaches a snapshot, so downstream code can rely on two guarantees:
//!
//! - values inside the deadzone are exactly `0.0`
//! - output magnitude never exceeds `1.0`
//!
//! # Key Functions
//!
//! - [`apply_deadzone`]: Per-axis deadzone with linear rescaling
//! - [`extract_triggers`]: Trigger values from extra axes or analog buttons
//! - [`stick_displacement`]: Euclidean norm of the primary stick

/// Largest deadzone a user may configure, in percent.
pub const MAX_DEADZONE_PERCENT: u8 = 30;

/// Upper bound of the deadzone threshold, whatever percent is passed in.
///
/// Keeps the rescaling denominator `1 - threshold` away from zero.
pub const MAX_DEADZONE_THRESHOLD: f64 = 0.95;

/// Number of leading axes that belong to the two sticks (lx, ly, rx, ry).
pub const STICK_AXIS_COUNT: usize = 4;

/// Button indices that carry analog trigger values on the standard layout.
pub const TRIGGER_BUTTON_INDICES: [usize; 2] = [6, 7];

/// Convert a deadzone percentage into a threshold in `[0.0, 0.95]`.
pub fn deadzone_threshold(deadzone_percent: f64) -> f64 {
    (deadzone_percent / 100.0).clamp(0.0, MAX_DEADZONE_THRESHOLD)
}

/// Apply deadzone correction to a single raw axis value.
///
/// Values with `|v| <= threshold` collapse to exactly zero. Values outside are
/// rescaled so the range `[threshold, 1.0]` maps onto `[0.0, 1.0]`, which keeps
/// the curve continuous at the threshold.
///
/// # Arguments
/// * `raw_value` - Raw axis value reported by the host (nominally -1.0 to 1.0)
/// * `deadzone_percent` - Deadzone in percent (0 to 30 from user settings)
///
/// # Returns
/// * Normalized value in `[-1.0, 1.0]`
///
/// # Example
/// ```
/// use gamepad_tester::input::gamepad::normalize::apply_deadzone;
///
/// assert_eq!(apply_deadzone(0.05, 8.0), 0.0);
/// assert_eq!(apply_deadzone(1.0, 8.0), 1.0);
/// assert!((apply_deadzone(-0.5, 8.0) + 0.4565).abs() < 1e-4);
/// ```
pub fn apply_deadzone(raw_value: f64, deadzone_percent: f64) -> f64 {
    let threshold = deadzone_threshold(deadzone_percent);
    let magnitude = raw_value.abs();

    if magnitude <= threshold {
        return 0.0;
    }

    let scaled = ((magnitude - threshold) / (1.0 - threshold)).min(1.0);
    raw_value.signum() * scaled
}

/// Normalize every axis of a frame with the same deadzone.
pub fn normalize_axes(raw_axes: &[f64], deadzone_percent: f64) -> Vec<f64> {
    raw_axes
        .iter()
        .map(|&v| apply_deadzone(v, deadzone_percent))
        .collect()
}

/// Clamp a value onto the unit interval used for axes and triggers.
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Remap an analog button value in `[0, 1]` onto the `[-1, 1]` trigger convention.
pub fn button_to_trigger(value: f64) -> f64 {
    value * 2.0 - 1.0
}

/// Extract trigger values for one frame.
///
/// Devices with more than four axes report their triggers as axes, so
/// `axes[4..]` is used (each clamped). Otherwise, devices with at least eight
/// buttons get two triggers synthesized from the analog buttons at indices 6
/// and 7. Anything smaller has no triggers.
///
/// # Arguments
/// * `raw_axes` - Raw axis values as reported by the host
/// * `button_values` - Analog button values in `[0, 1]`
pub fn extract_triggers(raw_axes: &[f64], button_values: &[f64]) -> Option<Vec<f64>> {
    if raw_axes.len() > STICK_AXIS_COUNT {
        return Some(
            raw_axes[STICK_AXIS_COUNT..]
                .iter()
                .map(|&v| clamp_unit(v))
                .collect(),
        );
    }

    if button_values.len() >= 8 {
        return Some(
            TRIGGER_BUTTON_INDICES
                .iter()
                .map(|&i| button_to_trigger(button_values[i]))
                .collect(),
        );
    }

    None
}

/// Euclidean displacement of the primary stick (axes 0 and 1).
///
/// Missing axes count as centered.
pub fn stick_displacement(axes: &[f64]) -> f64 {
    let x = axes.first().copied().unwrap_or(0.0);
    let y = axes.get(1).copied().unwrap_or(0.0);
    (x * x + y * y).sqrt()
}

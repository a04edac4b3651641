//! Button edge detection between consecutive frames

use serde::Serialize;

/// Direction of a button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Pressed,
    Released,
}

/// A button on one controller changed state between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputEdgeEvent {
    pub kind: EdgeKind,
    pub button_index: usize,
    pub controller_index: usize,
    /// Session clock time (ms) of the frame that detected the transition
    pub occurred_at: f64,
}

impl InputEdgeEvent {
    pub fn is_press(&self) -> bool {
        self.kind == EdgeKind::Pressed
    }
}

/// Diff two button-state vectors and return the flipped indices in ascending order.
///
/// A missing previous record (or a previous record shorter than `current`)
/// counts as "not pressed", so a controller seen for the first time only ever
/// yields presses. Buttons that disappeared from `current` yield nothing.
pub fn diff_buttons(previous: Option<&[bool]>, current: &[bool]) -> Vec<(EdgeKind, usize)> {
    let previous = previous.unwrap_or(&[]);

    current
        .iter()
        .enumerate()
        .filter_map(|(i, &now)| {
            let before = previous.get(i).copied().unwrap_or(false);
            match (before, now) {
                (false, true) => Some((EdgeKind::Pressed, i)),
                (true, false) => Some((EdgeKind::Released, i)),
                _ => None,
            }
        })
        .collect()
}

//! Rolling session statistics and the reaction-time trial state machine

use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates collected over one testing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputStatistics {
    pub total_button_presses: u64,
    pub total_sampled_time_ms: f64,
    /// Two-term running average, `None` until the first completed trial
    pub average_reaction_time_ms: Option<f64>,
    pub max_stick_displacement: f64,
    /// Controller index -> press count per button index
    pub per_button_press_count: BTreeMap<usize, Vec<u64>>,
}

impl InputStatistics {
    /// Count one press, growing the controller's histogram with zeros as needed.
    pub fn record_press(&mut self, controller_index: usize, button_index: usize) {
        self.total_button_presses += 1;

        let counts = self.per_button_press_count.entry(controller_index).or_default();
        if counts.len() <= button_index {
            counts.resize(button_index + 1, 0);
        }
        counts[button_index] += 1;
    }

    /// Fold a completed reaction-time measurement into the running average.
    ///
    /// This is `(old + new) / 2`, not a cumulative mean: older trials decay
    /// exponentially.
    pub fn record_reaction(&mut self, elapsed_ms: f64) {
        self.average_reaction_time_ms = Some(match self.average_reaction_time_ms {
            Some(old) => (old + elapsed_ms) / 2.0,
            None => elapsed_ms,
        });
    }

    pub fn observe_displacement(&mut self, displacement: f64) {
        if displacement > self.max_stick_displacement {
            self.max_stick_displacement = displacement;
        }
    }

    pub fn add_sampled_time(&mut self, delta_ms: f64) {
        self.total_sampled_time_ms += delta_ms;
    }

    pub fn press_count(&self, controller_index: usize, button_index: usize) -> u64 {
        self.per_button_press_count
            .get(&controller_index)
            .and_then(|counts| counts.get(button_index))
            .copied()
            .unwrap_or(0)
    }

    /// Average reaction time, reading 0 when nothing was measured yet.
    pub fn average_reaction_or_zero(&self) -> f64 {
        self.average_reaction_time_ms.unwrap_or(0.0)
    }
}

/// Reaction-time trial: Disarmed -> (arm) -> Armed -> (press | release) -> Disarmed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LatencyTrial {
    #[default]
    Disarmed,
    Armed { started_at_ms: f64 },
}

impl LatencyTrial {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    /// Arm (or re-arm) the trial at `now_ms`.
    pub fn arm(&mut self, now_ms: f64) {
        *self = Self::Armed {
            started_at_ms: now_ms,
        };
    }

    /// A press completes an armed trial. Returns the elapsed time, if any.
    pub fn complete(&mut self, now_ms: f64) -> Option<f64> {
        match std::mem::take(self) {
            Self::Armed { started_at_ms } => Some((now_ms - started_at_ms).max(0.0)),
            Self::Disarmed => None,
        }
    }

    /// A release cancels an armed trial without a result. Returns whether it was armed.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        *self = Self::Disarmed;
        was_armed
    }
}

/// Results of every completed trial in the session, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyResults {
    samples_ms: Vec<f64>,
}

impl LatencyResults {
    pub fn push(&mut self, elapsed_ms: f64) {
        self.samples_ms.push(elapsed_ms);
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples_ms
    }

    pub fn len(&self) -> usize {
        self.samples_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_ms.is_empty()
    }

    pub fn best_ms(&self) -> Option<f64> {
        self.samples_ms.iter().copied().reduce(f64::min)
    }

    pub fn worst_ms(&self) -> Option<f64> {
        self.samples_ms.iter().copied().reduce(f64::max)
    }

    pub fn clear(&mut self) {
        self.samples_ms.clear();
    }
}

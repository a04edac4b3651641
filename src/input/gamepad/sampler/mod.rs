//! Per-frame gamepad sampling session
//!
//! [`SamplerSession`] owns everything that survives between frames: the
//! previous button states per controller, the rolling statistics, the recent
//! edge log and the reaction-time trial. Whatever drives the render loop (a
//! timer thread, a replay, a test) calls [`SamplerSession::sample`] once per
//! tick and reads the rest back through accessors.

#[cfg(test)]
mod tests;

use super::clock::{Clock, MonotonicClock};
use super::edges::{diff_buttons, EdgeKind, InputEdgeEvent};
use super::frame::GamepadFrame;
use super::history::EdgeHistory;
use super::host::GamepadHost;
use super::normalize::{extract_triggers, normalize_axes, stick_displacement, MAX_DEADZONE_PERCENT};
use super::stats::{InputStatistics, LatencyResults, LatencyTrial};
use crate::config::SamplerConfig;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// One connected controller at one sampled instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub index: usize,
    pub display_name: String,
    pub button_states: Vec<bool>,
    /// Post-deadzone values in `[-1, 1]`
    pub axis_values: Vec<f64>,
    pub trigger_values: Option<Vec<f64>>,
    /// Device-reported timestamp
    pub sample_timestamp: f64,
}

/// Explicit state of one testing session
pub struct SamplerSession<C: Clock = MonotonicClock> {
    clock: C,
    deadzone_percent: u8,
    max_delta_ms: f64,
    previous_buttons: HashMap<usize, Vec<bool>>,
    stats: InputStatistics,
    history: EdgeHistory,
    trial: LatencyTrial,
    latency_results: LatencyResults,
    snapshots: Vec<ControllerSnapshot>,
}

impl SamplerSession<MonotonicClock> {
    /// Session with default settings on the monotonic clock
    pub fn with_defaults() -> Self {
        Self::new(&SamplerConfig::default(), MonotonicClock::new())
    }
}

impl<C: Clock> SamplerSession<C> {
    pub fn new(config: &SamplerConfig, clock: C) -> Self {
        Self {
            clock,
            deadzone_percent: config.deadzone_percent.min(MAX_DEADZONE_PERCENT),
            max_delta_ms: sanitize_max_delta(config.max_delta_ms),
            previous_buttons: HashMap::new(),
            stats: InputStatistics::default(),
            history: EdgeHistory::new(config.history_capacity),
            trial: LatencyTrial::Disarmed,
            latency_results: LatencyResults::default(),
            snapshots: Vec::new(),
        }
    }

    /// Apply changed settings without touching collected statistics
    pub fn apply_config(&mut self, config: &SamplerConfig) {
        self.set_deadzone(config.deadzone_percent);
        self.max_delta_ms = sanitize_max_delta(config.max_delta_ms);
        self.history.set_capacity(config.history_capacity);
    }

    /// Sample one frame with the session's current deadzone
    pub fn sample(&mut self, host: &mut dyn GamepadHost, delta_ms: f64) -> Vec<ControllerSnapshot> {
        let deadzone = self.deadzone_percent;
        self.sample_with_deadzone(host, delta_ms, deadzone)
    }

    /// Sample one frame.
    ///
    /// Reads every connected controller, normalizes its axes, derives press and
    /// release edges against the previous frame, and folds them into the
    /// statistics, the reaction trial and the edge log. A host without gamepad
    /// support leaves the session untouched; a controller whose shape fails
    /// validation is skipped for this frame only.
    pub fn sample_with_deadzone(
        &mut self,
        host: &mut dyn GamepadHost,
        delta_ms: f64,
        deadzone_percent: u8,
    ) -> Vec<ControllerSnapshot> {
        if !host.is_supported() {
            trace!("Host has no gamepad support, frame skipped");
            return Vec::new();
        }

        let delta_ms = self.clamp_delta(delta_ms);
        let deadzone = deadzone_percent.min(MAX_DEADZONE_PERCENT) as f64;
        let now = self.clock.now_ms();

        let slots = host.poll();

        let mut snapshots = Vec::with_capacity(slots.len());
        let mut edges = Vec::new();

        for raw in slots.into_iter().flatten() {
            if !raw.connected {
                continue;
            }

            let frame = match GamepadFrame::try_from(raw) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Skipping controller this frame: {}", e);
                    continue;
                },
            };

            let axis_values = normalize_axes(&frame.axes, deadzone);
            let trigger_values = extract_triggers(&frame.axes, &frame.button_values);

            let previous = self.previous_buttons.get(&frame.index).map(Vec::as_slice);
            for (kind, button_index) in diff_buttons(previous, &frame.pressed) {
                edges.push(InputEdgeEvent {
                    kind,
                    button_index,
                    controller_index: frame.index,
                    occurred_at: now,
                });
            }

            self.stats.observe_displacement(stick_displacement(&axis_values));
            self.previous_buttons.insert(frame.index, frame.pressed.clone());

            snapshots.push(ControllerSnapshot {
                index: frame.index,
                display_name: frame.name,
                button_states: frame.pressed,
                axis_values,
                trigger_values,
                sample_timestamp: frame.timestamp,
            });
        }

        for edge in edges.iter().filter(|e| e.kind == EdgeKind::Pressed) {
            debug!(
                "Pressed: controller {} button {}",
                edge.controller_index, edge.button_index
            );
            self.stats.record_press(edge.controller_index, edge.button_index);

            if let Some(elapsed) = self.trial.complete(now) {
                info!("Reaction time: {:.1} ms", elapsed);
                self.latency_results.push(elapsed);
                self.stats.record_reaction(elapsed);
            }
        }

        for edge in edges.iter().filter(|e| e.kind == EdgeKind::Released) {
            debug!(
                "Released: controller {} button {}",
                edge.controller_index, edge.button_index
            );
            // Any release aborts an armed trial, not only the button that would have completed it
            if self.trial.cancel() {
                debug!("Reaction trial cancelled by release");
            }
        }

        self.stats.add_sampled_time(delta_ms);
        self.history.extend(edges.iter().copied());

        trace!(
            "Sampled {} controller(s), {} edge(s), dt={:.1}ms",
            snapshots.len(),
            edges.len(),
            delta_ms
        );

        self.snapshots = snapshots.clone();
        snapshots
    }

    fn clamp_delta(&self, delta_ms: f64) -> f64 {
        if delta_ms.is_finite() {
            delta_ms.max(0.0).min(self.max_delta_ms)
        } else {
            0.0
        }
    }

    /// Set the deadzone used by [`Self::sample`], clamped to 0-30 percent
    pub fn set_deadzone(&mut self, percent: u8) {
        let clamped = percent.min(MAX_DEADZONE_PERCENT);
        if clamped != percent {
            debug!("Deadzone {}% clamped to {}%", percent, clamped);
        }
        self.deadzone_percent = clamped;
    }

    /// Start (or restart) a reaction-time trial at the current clock time
    pub fn arm_latency_trial(&mut self) {
        let now = self.clock.now_ms();
        self.trial.arm(now);
        debug!("Reaction trial armed at {:.1} ms", now);
    }

    /// Zero all statistics and forget every per-controller record
    pub fn reset(&mut self) {
        self.stats = InputStatistics::default();
        self.latency_results.clear();
        self.trial = LatencyTrial::Disarmed;
        self.previous_buttons.clear();
        self.history.clear();
        info!("Session statistics reset");
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn statistics(&self) -> &InputStatistics {
        &self.stats
    }

    pub fn history(&self) -> &EdgeHistory {
        &self.history
    }

    pub fn latency_trial(&self) -> LatencyTrial {
        self.trial
    }

    pub fn latency_results(&self) -> &LatencyResults {
        &self.latency_results
    }

    pub fn deadzone_percent(&self) -> u8 {
        self.deadzone_percent
    }

    /// Snapshots produced by the most recent frame
    pub fn snapshots(&self) -> &[ControllerSnapshot] {
        &self.snapshots
    }
}

/// Unusable caps fall back to the default so `sample` never sees one.
fn sanitize_max_delta(max_delta_ms: f64) -> f64 {
    if max_delta_ms.is_finite() && max_delta_ms > 0.0 {
        max_delta_ms
    } else {
        let fallback = SamplerConfig::default().max_delta_ms;
        warn!(
            "Invalid max_delta_ms {}, using {} ms",
            max_delta_ms, fallback
        );
        fallback
    }
}

//! Tests for the sampler session

use super::*;
use crate::input::gamepad::clock::ManualClock;
use crate::input::gamepad::frame::{RawButton, RawGamepad};
use crate::input::gamepad::host::StaticHost;

fn pad(index: usize, pressed: &[bool], axes: &[f64]) -> RawGamepad {
    RawGamepad {
        index,
        connected: true,
        id: format!("Test Pad {}", index),
        buttons: Some(pressed.iter().map(|&p| RawButton::digital(p)).collect()),
        axes: Some(axes.to_vec()),
        timestamp: 0.0,
    }
}

fn make_session() -> (SamplerSession<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0.0);
    let session = SamplerSession::new(&SamplerConfig::default(), clock.clone());
    (session, clock)
}

fn buttons_with(count: usize, pressed: &[usize]) -> Vec<bool> {
    (0..count).map(|i| pressed.contains(&i)).collect()
}

#[test]
fn test_unsupported_host_leaves_session_untouched() {
    let (mut session, _) = make_session();
    let mut live = StaticHost::new(vec![Some(pad(0, &[true], &[0.5, 0.0]))]);
    session.sample(&mut live, 16.0);
    let stats_before = session.statistics().clone();
    let snapshots_before = session.snapshots().to_vec();

    let mut host = StaticHost::unsupported();
    let snapshots = session.sample(&mut host, 16.0);

    assert!(snapshots.is_empty());
    assert_eq!(session.statistics(), &stats_before);
    assert_eq!(session.statistics().total_sampled_time_ms, 16.0);
    assert_eq!(session.snapshots(), snapshots_before.as_slice());
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_invalid_delta_cap_falls_back_to_default() {
    let clock = ManualClock::new(0.0);
    let config = SamplerConfig {
        max_delta_ms: -1.0,
        ..SamplerConfig::default()
    };
    let mut session = SamplerSession::new(&config, clock);
    let mut host = StaticHost::new(vec![Some(pad(0, &[false], &[0.0]))]);

    session.sample(&mut host, 500.0);
    assert_eq!(session.statistics().total_sampled_time_ms, 100.0);

    session.apply_config(&SamplerConfig {
        max_delta_ms: f64::NAN,
        ..SamplerConfig::default()
    });
    session.sample(&mut host, 40.0);
    assert_eq!(session.statistics().total_sampled_time_ms, 140.0);
}

#[test]
fn test_sparse_slots_skipped() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![None, Some(pad(1, &[false], &[0.0, 0.0])), None]);

    let snapshots = session.sample(&mut host, 16.0);

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].index, 1);
    assert_eq!(snapshots[0].display_name, "Test Pad 1");
}

#[test]
fn test_disconnected_entry_skipped() {
    let (mut session, _) = make_session();
    let mut gone = pad(0, &[true], &[0.0]);
    gone.connected = false;
    let mut host = StaticHost::new(vec![Some(gone)]);

    assert!(session.sample(&mut host, 16.0).is_empty());
    assert_eq!(session.statistics().total_button_presses, 0);
}

#[test]
fn test_malformed_device_does_not_abort_frame() {
    let (mut session, _) = make_session();
    let mut broken = pad(0, &[true], &[0.0]);
    broken.axes = None;
    let mut host = StaticHost::new(vec![Some(broken), Some(pad(1, &[true], &[0.0, 0.0]))]);

    let snapshots = session.sample(&mut host, 16.0);

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].index, 1);
    assert_eq!(session.statistics().total_button_presses, 1);
}

#[test]
fn test_axes_normalized_with_deadzone() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[], &[0.05, 1.0, -0.5, 0.0]))]);

    let snapshots = session.sample_with_deadzone(&mut host, 16.0, 8);
    let axes = &snapshots[0].axis_values;

    assert_eq!(axes[0], 0.0);
    assert_eq!(axes[1], 1.0);
    assert!((axes[2] + 0.4565).abs() < 1e-4);
    assert_eq!(axes[3], 0.0);
}

#[test]
fn test_press_edge_against_previous_frame() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[false, true, false], &[]))]);
    session.sample(&mut host, 16.0);
    session.clear_history();

    host.slots = vec![Some(pad(0, &[true, true, false], &[]))];
    session.sample(&mut host, 16.0);

    let edges = session.history().to_vec();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Pressed);
    assert_eq!(edges[0].button_index, 0);
}

#[test]
fn test_first_frame_only_presses() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(3, &[true, false], &[]))]);

    session.sample(&mut host, 16.0);

    let edges = session.history().to_vec();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Pressed);
    assert_eq!(edges[0].button_index, 0);
    assert_eq!(edges[0].controller_index, 3);
}

#[test]
fn test_statistics_accumulate() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![]);

    // Press, release and press again on alternating buttons: one new press per frame
    for frame in 0..3 {
        host.slots = vec![Some(pad(0, &buttons_with(4, &[frame]), &[]))];
        session.sample(&mut host, 16.0);
    }

    assert_eq!(session.statistics().total_button_presses, 3);
    assert_eq!(session.statistics().total_sampled_time_ms, 48.0);
    assert_eq!(session.statistics().per_button_press_count[&0], vec![1, 1, 1]);
}

#[test]
fn test_delta_clamped() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![]);

    session.sample(&mut host, 5000.0);
    session.sample(&mut host, -3.0);
    session.sample(&mut host, f64::NAN);

    assert_eq!(session.statistics().total_sampled_time_ms, 100.0);
}

#[test]
fn test_latency_trial_completed_by_press() {
    let (mut session, clock) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[false, false], &[]))]);
    session.sample(&mut host, 16.0);

    clock.set(1000.0);
    session.arm_latency_trial();
    assert!(session.latency_trial().is_armed());

    clock.set(1250.0);
    host.slots = vec![Some(pad(0, &[false, true], &[]))];
    session.sample(&mut host, 16.0);

    assert!(!session.latency_trial().is_armed());
    assert_eq!(session.latency_results().samples(), &[250.0]);
    assert_eq!(session.statistics().average_reaction_time_ms, Some(250.0));

    // A second trial folds in as a two-term average
    session.arm_latency_trial();
    clock.advance(150.0);
    host.slots = vec![Some(pad(0, &[true, true], &[]))];
    session.sample(&mut host, 16.0);

    assert_eq!(session.latency_results().samples(), &[250.0, 150.0]);
    assert_eq!(session.statistics().average_reaction_time_ms, Some(200.0));
}

#[test]
fn test_latency_trial_cancelled_by_release() {
    let (mut session, clock) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[true, false], &[]))]);
    session.sample(&mut host, 16.0);

    session.arm_latency_trial();
    clock.advance(300.0);
    host.slots = vec![Some(pad(0, &[false, false], &[]))];
    session.sample(&mut host, 16.0);

    assert!(!session.latency_trial().is_armed());
    assert!(session.latency_results().is_empty());
    assert_eq!(session.statistics().average_reaction_time_ms, None);

    // The next press is an ordinary press, not a trial result
    host.slots = vec![Some(pad(0, &[false, true], &[]))];
    session.sample(&mut host, 16.0);
    assert!(session.latency_results().is_empty());
}

#[test]
fn test_press_before_release_in_same_frame_completes_trial() {
    let (mut session, clock) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[true, false], &[]))]);
    session.sample(&mut host, 16.0);

    session.arm_latency_trial();
    clock.advance(90.0);
    host.slots = vec![Some(pad(0, &[false, true], &[]))];
    session.sample(&mut host, 16.0);

    assert_eq!(session.latency_results().samples(), &[90.0]);
}

#[test]
fn test_max_stick_displacement() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[], &[0.6, 0.8, 0.0, 0.0]))]);
    session.sample_with_deadzone(&mut host, 16.0, 0);

    host.slots = vec![Some(pad(0, &[], &[0.0, 0.0, 0.0, 0.0]))];
    session.sample_with_deadzone(&mut host, 16.0, 0);

    assert!((session.statistics().max_stick_displacement - 1.0).abs() < 1e-12);
}

#[test]
fn test_triggers_in_snapshot() {
    let (mut session, _) = make_session();
    let mut buttons: Vec<RawButton> = (0..16).map(|_| RawButton::digital(false)).collect();
    buttons[6] = RawButton::analog(0.5, false);
    buttons[7] = RawButton::analog(1.0, true);
    let mut raw = pad(0, &[], &[0.0; 4]);
    raw.buttons = Some(buttons);
    let mut host = StaticHost::new(vec![Some(raw)]);

    let snapshots = session.sample(&mut host, 16.0);

    assert_eq!(snapshots[0].trigger_values, Some(vec![0.0, 1.0]));
}

#[test]
fn test_reset_is_idempotent_and_forgets_previous_frame() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[true, false], &[1.0, 0.0]))]);
    session.sample(&mut host, 16.0);
    session.arm_latency_trial();

    session.reset();
    let stats_once = session.statistics().clone();
    session.reset();

    assert_eq!(session.statistics(), &stats_once);
    assert_eq!(stats_once, InputStatistics::default());
    assert!(session.history().is_empty());
    assert!(session.latency_results().is_empty());
    assert!(!session.latency_trial().is_armed());

    // Button 0 is still held: it shows up as a fresh press, with no ghost release
    host.slots = vec![Some(pad(0, &[true, false], &[0.0, 0.0]))];
    session.sample(&mut host, 16.0);

    let edges = session.history().to_vec();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Pressed);
    assert_eq!(session.statistics().total_button_presses, 1);
    assert_eq!(session.statistics().max_stick_displacement, 0.0);
}

#[test]
fn test_history_bounded_newest_first() {
    let (mut session, clock) = make_session();
    let mut host = StaticHost::new(vec![]);

    // Alternate press/release of button 0: one edge per frame, 20 frames
    for frame in 0..20 {
        clock.set(frame as f64);
        host.slots = vec![Some(pad(0, &[frame % 2 == 0], &[]))];
        session.sample(&mut host, 16.0);
    }

    let edges = session.history().to_vec();
    assert_eq!(edges.len(), 14);
    let times: Vec<f64> = edges.iter().map(|e| e.occurred_at).collect();
    assert_eq!(times, (6..20).rev().map(|t| t as f64).collect::<Vec<_>>());
    assert_eq!(edges[0].kind, EdgeKind::Released);
}

#[test]
fn test_history_shared_across_controllers() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![
        Some(pad(0, &[true; 10], &[])),
        Some(pad(1, &[true; 10], &[])),
    ]);

    session.sample(&mut host, 16.0);

    assert_eq!(session.history().len(), 14);
    assert_eq!(session.statistics().total_button_presses, 20);
    assert_eq!(session.history().to_vec()[0].controller_index, 1);
}

#[test]
fn test_sixteen_button_scenario() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[false; 16], &[0.0; 4]))]);
    session.sample(&mut host, 16.0);

    host.slots = vec![Some(pad(0, &buttons_with(16, &[5]), &[0.0; 4]))];
    let snapshots = session.sample(&mut host, 16.0);

    assert!(snapshots[0].button_states[5]);
    let edges = session.history().to_vec();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Pressed);
    assert_eq!(edges[0].button_index, 5);
    assert_eq!(session.statistics().total_button_presses, 1);
    assert_eq!(session.statistics().press_count(0, 5), 1);
}

#[test]
fn test_set_deadzone_clamps() {
    let (mut session, _) = make_session();
    session.set_deadzone(99);
    assert_eq!(session.deadzone_percent(), 30);
    session.set_deadzone(0);
    assert_eq!(session.deadzone_percent(), 0);
}

#[test]
fn test_apply_config_keeps_statistics() {
    let (mut session, _) = make_session();
    let mut host = StaticHost::new(vec![Some(pad(0, &[true], &[]))]);
    session.sample(&mut host, 16.0);

    let config = SamplerConfig {
        deadzone_percent: 20,
        max_delta_ms: 50.0,
        history_capacity: 4,
    };
    session.apply_config(&config);

    assert_eq!(session.deadzone_percent(), 20);
    assert_eq!(session.history().capacity(), 4);
    assert_eq!(session.statistics().total_button_presses, 1);
}

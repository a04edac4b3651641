//! Gamepad Tester - frame-by-frame controller diagnostics
//!
//! Samples connected gamepads once per tick, normalizes their axes, derives
//! press/release edges and keeps session statistics including reaction-time
//! trials.

pub mod cli;
pub mod config;
pub mod input;
pub mod paths;
pub mod report;

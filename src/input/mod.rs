//! Input sources

pub mod gamepad;

//! Gamepad sampling using GilRs
//!
//! Provides per-frame controller sampling with deadzone normalization,
//! press/release edge detection, session statistics and reaction-time
//! trials, plus the hosts that feed it (live gilrs devices or recordings).

pub mod clock;
pub mod diagnostics;
pub mod edges;
pub mod frame;
pub mod gilrs_host;
pub mod history;
pub mod host;
pub mod normalize;
pub mod provider;
pub mod replay;
pub mod sampler;
pub mod stats;

pub use diagnostics::print_gamepad_diagnostics;
pub use edges::{EdgeKind, InputEdgeEvent};
pub use frame::{FrameError, GamepadFrame, RawButton, RawGamepad};
pub use host::{GamepadHost, HapticEffect, HapticError, HapticKind};
pub use provider::{SamplerProvider, SessionCommand};
pub use sampler::{ControllerSnapshot, SamplerSession};
pub use stats::{InputStatistics, LatencyTrial};

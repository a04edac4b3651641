//! Recorded-session host
//!
//! A recording is a JSON-lines file, one frame per line:
//!
//! ```text
//! {"delta_ms":16,"pads":[{"index":0,"id":"Pad","buttons":[{"pressed":true}],"axes":[0.1,0.0]}]}
//! {"delta_ms":16,"pads":[null,{"index":1,"id":"Other","buttons":[],"axes":[]}]}
//! ```
//!
//! Optional `"command"` fields (`"arm"`, `"reset"`, `"clear"`, or a
//! `{"deadzone":N}` object) are applied before the frame is sampled, which
//! lets a recording exercise the reaction-time trial deterministically.

use super::clock::{Clock, ManualClock};
use super::frame::RawGamepad;
use super::host::GamepadHost;
use super::sampler::SamplerSession;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Session command embedded in a recording
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayCommand {
    Arm,
    Reset,
    Clear,
    Deadzone(u8),
}

/// One recorded frame
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub delta_ms: f64,
    #[serde(default)]
    pub command: Option<ReplayCommand>,
    #[serde(default)]
    pub pads: Vec<Option<RawGamepad>>,
}

/// Parse a JSON-lines recording. Blank lines are ignored.
pub fn parse_recording<R: BufRead>(reader: R) -> Result<Vec<RecordedFrame>, ReplayError> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
            line: i + 1,
            source,
        })?;
        frames.push(frame);
    }
    Ok(frames)
}

pub fn load_recording(path: &Path) -> Result<Vec<RecordedFrame>, ReplayError> {
    let file = std::fs::File::open(path)?;
    parse_recording(std::io::BufReader::new(file))
}

/// Host that hands out one recorded frame per poll
#[derive(Debug, Default)]
pub struct ReplayHost {
    frames: VecDeque<Vec<Option<RawGamepad>>>,
}

impl ReplayHost {
    pub fn push(&mut self, pads: Vec<Option<RawGamepad>>) {
        self.frames.push_back(pads);
    }
}

impl GamepadHost for ReplayHost {
    fn poll(&mut self) -> Vec<Option<RawGamepad>> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Drive a session through a whole recording.
///
/// The clock advances by each frame's (unclamped) delta before the frame is
/// sampled, so reaction times come out as the sum of the recorded deltas.
pub fn run_replay(session: &mut SamplerSession<ManualClock>, clock: &ManualClock, frames: Vec<RecordedFrame>) {
    let mut host = ReplayHost::default();
    let count = frames.len();

    for frame in frames {
        clock.advance(frame.delta_ms.max(0.0));

        match frame.command {
            Some(ReplayCommand::Arm) => session.arm_latency_trial(),
            Some(ReplayCommand::Reset) => session.reset(),
            Some(ReplayCommand::Clear) => session.clear_history(),
            Some(ReplayCommand::Deadzone(percent)) => session.set_deadzone(percent),
            None => {},
        }

        host.push(frame.pads);
        session.sample(&mut host, frame.delta_ms);
    }

    info!("Replayed {} frame(s) ending at {:.1} ms", count, clock.now_ms());
    debug!("Replay statistics: {:?}", session.statistics());
}

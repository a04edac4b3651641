//! Live sampling runtime
//!
//! GilRs is not `Send` on every platform, so the host and the session live on
//! a dedicated thread that ticks at the configured interval. The async side
//! talks to it through a command channel and observes it through a watch
//! channel carrying the latest [`SessionReport`].

use super::clock::MonotonicClock;
use super::gilrs_host::GilrsHost;
use super::host::{GamepadHost, HapticEffect};
use super::sampler::SamplerSession;
use crate::config::AppConfig;
use crate::report::SessionReport;
use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Commands accepted by the sampling thread
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SetDeadzone(u8),
    ArmLatencyTrial,
    Reset,
    ClearHistory,
    Rumble(usize),
    ApplyConfig(Box<AppConfig>),
}

/// Handle to the running sampler thread
pub struct SamplerProvider {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    report_rx: watch::Receiver<SessionReport>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SamplerProvider {
    /// Spawn the sampling thread with the given configuration
    pub fn start(config: AppConfig) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = watch::channel(SessionReport::default());
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        let thread = std::thread::Builder::new()
            .name("gamepad-sampler".to_string())
            .spawn(move || Self::sample_loop(config, command_rx, report_tx, shutdown_rx))?;

        Ok(Self {
            command_tx,
            report_rx,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Queue a command for the next tick
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| anyhow::anyhow!("Sampler thread has stopped"))
    }

    /// Latest published report
    pub fn report(&self) -> SessionReport {
        self.report_rx.borrow().clone()
    }

    /// Receiver that wakes whenever a new report is published
    pub fn subscribe(&self) -> watch::Receiver<SessionReport> {
        self.report_rx.clone()
    }

    /// Main loop (runs in dedicated thread)
    fn sample_loop(
        mut config: AppConfig,
        mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        report_tx: watch::Sender<SessionReport>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        // Initialize gilrs in this thread (not Send-safe)
        let mut host = match GilrsHost::new() {
            Ok(host) => host,
            Err(e) => {
                warn!("{}. No gamepads will be reported.", e);
                return;
            },
        };

        let mut session = SamplerSession::new(&config.sampler, MonotonicClock::new());
        let mut last_tick = Instant::now();
        info!(
            "Sampling every {} ms (deadzone {}%)",
            config.poll.interval_ms, config.sampler.deadzone_percent
        );

        loop {
            match shutdown_rx.try_recv() {
                Ok(_) | Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!("Sampler shutting down");
                    break;
                },
                Err(mpsc::error::TryRecvError::Empty) => {},
            }

            while let Ok(command) = command_rx.try_recv() {
                Self::apply_command(&mut session, &mut host, &mut config, command);
            }

            let now = Instant::now();
            let delta_ms = now.duration_since(last_tick).as_secs_f64() * 1000.0;
            last_tick = now;

            session.sample(&mut host, delta_ms);

            if report_tx.send(session.report()).is_err() {
                debug!("Report receivers dropped, stopping sampler");
                break;
            }

            std::thread::sleep(Duration::from_millis(config.poll.interval_ms));
        }
    }

    fn apply_command(
        session: &mut SamplerSession<MonotonicClock>,
        host: &mut dyn GamepadHost,
        config: &mut AppConfig,
        command: SessionCommand,
    ) {
        debug!("Session command: {:?}", command);
        match command {
            SessionCommand::SetDeadzone(percent) => {
                session.set_deadzone(percent);
                info!("Deadzone set to {}%", session.deadzone_percent());
            },
            SessionCommand::ArmLatencyTrial => {
                session.arm_latency_trial();
                info!("⏱️  Reaction trial armed: press any button");
            },
            SessionCommand::Reset => session.reset(),
            SessionCommand::ClearHistory => session.clear_history(),
            SessionCommand::Rumble(index) => rumble(host, index, config.haptics.effect()),
            SessionCommand::ApplyConfig(new_config) => {
                session.apply_config(&new_config.sampler);
                *config = *new_config;
                info!("Configuration applied to running session");
            },
        }
    }

    /// Stop the sampling thread and wait for it
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
            info!("Sampler shutdown requested");
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Sampler thread panicked");
            }
        }
    }
}

impl Drop for SamplerProvider {
    fn drop(&mut self) {
        // Attempt to send shutdown signal if not already sent
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

/// Fire-and-forget rumble; failures are expected on many pads and are only logged
pub fn rumble(host: &mut dyn GamepadHost, controller_index: usize, effect: HapticEffect) {
    match host.vibrate(controller_index, effect) {
        Ok(()) => info!("📳 Rumble sent to controller {}", controller_index),
        Err(e) => debug!("Rumble ignored: {}", e),
    }
}

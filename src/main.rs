//! Gamepad Tester
//!
//! Terminal front-end for the gamepad sampler: live sampling with an
//! interactive console, device diagnostics, and offline replays.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamepad_tester::cli::{self, ConsoleInput, HELP};
use gamepad_tester::config::{AppConfig, ConfigWatcher};
use gamepad_tester::input::gamepad::clock::ManualClock;
use gamepad_tester::input::gamepad::gilrs_host::standard_button_label;
use gamepad_tester::input::gamepad::provider::{SamplerProvider, SessionCommand};
use gamepad_tester::input::gamepad::replay;
use gamepad_tester::input::gamepad::{print_gamepad_diagnostics, EdgeKind, SamplerSession};
use gamepad_tester::paths::AppPaths;
use gamepad_tester::report::{self, SessionReport};

/// Gamepad Tester - sample controllers, measure reaction time, inspect edges
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to the app data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Console log format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Also write daily-rotated logs to the logs directory
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    /// One JSON object per line, for piping into log tooling
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample connected gamepads with an interactive console (default)
    Run,
    /// Print detected gamepads and exit
    Diagnostics {
        /// Seconds to wait for controllers to wake up
        #[arg(long, default_value = "3")]
        wait: u64,
    },
    /// Replay a JSON-lines recording and print the resulting statistics
    Replay {
        file: PathBuf,
        /// Also export a JSON report
        #[arg(long)]
        report: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let paths = AppPaths::detect();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args.log_level, args.log_format, args.log_file.then_some(&paths))?;

    info!("Starting Gamepad Tester v{}...", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    info!("Configuration file: {}", config_path.display());

    match args.command.unwrap_or(Command::Run) {
        Command::Diagnostics { wait } => {
            tokio::task::spawn_blocking(move || print_gamepad_diagnostics(Duration::from_secs(wait)))
                .await?;
        },
        Command::Replay { file, report: export } => {
            let config = AppConfig::load_or_default(&config_path).await?;
            run_replay(&file, &config, export.then(|| export_dir(&config, &paths)))?;
        },
        Command::Run => {
            run_app(&config_path, &paths).await?;
        },
    }

    info!("Gamepad Tester shutdown complete");
    Ok(())
}

async fn run_app(config_path: &Path, paths: &AppPaths) -> Result<()> {
    // Hot reload only makes sense for a file that exists
    let (mut config_watcher, config) = if config_path.exists() {
        let (watcher, config) = ConfigWatcher::new(config_path).await?;
        info!("Configuration loaded successfully with hot-reload enabled");
        (Some(watcher), (*config).clone())
    } else {
        info!("No configuration file, using defaults");
        (None, AppConfig::default())
    };

    let exports = export_dir(&config, paths);
    let mut provider = SamplerProvider::start(config)?;
    let mut reports = provider.subscribe();

    let (console_tx, mut console_rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = cli::run_repl(console_tx) {
            warn!("Console stopped: {}", e);
        }
    });

    println!("{}", "Gamepad Tester ready. Type 'help' for commands.".bold().cyan());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_edge_count = 0usize;
    let mut last_connected = 0usize;

    loop {
        tokio::select! {
            Some(input) = console_rx.recv() => {
                match input {
                    ConsoleInput::Session(command) => {
                        if let Err(e) = provider.send(command) {
                            warn!("{}", e);
                        }
                    },
                    ConsoleInput::Stats => print_stats(&provider.report()),
                    ConsoleInput::History => print_history(&provider.report()),
                    ConsoleInput::Export => {
                        match report::export_json(&provider.report(), &exports) {
                            Ok(path) => println!("{} {}", "Report written to".green(), path.display()),
                            // Export failures are transient and never touch the session
                            Err(e) => println!("{} {:#}", "Export failed:".red(), e),
                        }
                    },
                    ConsoleInput::Help => println!("{}", HELP),
                    ConsoleInput::Quit => break,
                }
            }

            Ok(()) = reports.changed() => {
                let report = reports.borrow_and_update().clone();
                if report.connected_count() != last_connected {
                    last_connected = report.connected_count();
                    info!("{} controller(s) connected", last_connected);
                }
                let total = report.statistics.total_button_presses as usize;
                if total != last_edge_count {
                    last_edge_count = total;
                    if let Some(edge) = report.history.first() {
                        tracing::debug!(
                            "Latest edge: {:?} {} on controller {}",
                            edge.kind,
                            standard_button_label(edge.button_index),
                            edge.controller_index
                        );
                    }
                }
            }

            Some(new_config) = next_config(&mut config_watcher) => {
                info!("📝 Configuration file changed, applying...");
                if let Err(e) = provider.send(SessionCommand::ApplyConfig(Box::new(new_config))) {
                    warn!("{}", e);
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping");
                break;
            }
        }
    }

    info!("Shutting down...");
    let final_report = provider.report();
    tokio::task::spawn_blocking(move || provider.shutdown()).await?;
    print_stats(&final_report);

    Ok(())
}

async fn next_config(watcher: &mut Option<ConfigWatcher>) -> Option<AppConfig> {
    match watcher {
        Some(w) => w.next_config().await,
        None => std::future::pending().await,
    }
}

fn export_dir(config: &AppConfig, paths: &AppPaths) -> PathBuf {
    config
        .export
        .directory
        .clone()
        .unwrap_or_else(|| paths.exports_dir.clone())
}

fn run_replay(file: &Path, config: &AppConfig, export_to: Option<PathBuf>) -> Result<()> {
    let frames = replay::load_recording(file)
        .with_context(|| format!("Failed to load recording: {}", file.display()))?;

    let clock = ManualClock::new(0.0);
    let mut session = SamplerSession::new(&config.sampler, clock.clone());
    replay::run_replay(&mut session, &clock, frames);

    let report = session.report();
    print_stats(&report);
    print_history(&report);

    if let Some(dir) = export_to {
        let path = report::export_json(&report, &dir)?;
        println!("{} {}", "Report written to".green(), path.display());
    }

    Ok(())
}

fn print_stats(report: &SessionReport) {
    println!("\n{}", "=== Session Statistics ===".bold().cyan());
    for line in report.summary_lines() {
        println!("  {}", line);
    }
}

fn print_history(report: &SessionReport) {
    println!("\n{}", "=== Recent Edges (newest first) ===".bold().cyan());
    if report.history.is_empty() {
        println!("  (none)");
        return;
    }
    for edge in &report.history {
        let kind = match edge.kind {
            EdgeKind::Pressed => "pressed ".green(),
            EdgeKind::Released => "released".yellow(),
        };
        println!(
            "  {:>10.1} ms  pad {}  {} {} ({})",
            edge.occurred_at,
            edge.controller_index,
            kind,
            edge.button_index,
            standard_button_label(edge.button_index)
        );
    }
}

fn init_logging(
    level: &str,
    format: LogFormat,
    file_paths: Option<&AppPaths>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (file_layer, guard) = match file_paths {
        Some(paths) => {
            paths.ensure_directories()?;
            let appender = tracing_appender::rolling::daily(&paths.logs_dir, "gamepad-tester.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    let text_layer = (format == LogFormat::Text).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
    });
    let json_layer = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_thread_names(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

//! Diagnostic summary of a sampler session and its JSON export

use crate::input::gamepad::clock::Clock;
use crate::input::gamepad::edges::InputEdgeEvent;
use crate::input::gamepad::sampler::{ControllerSnapshot, SamplerSession};
use crate::input::gamepad::stats::{InputStatistics, LatencyTrial};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Reaction-time section of a report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub trial: LatencyTrial,
    pub results_ms: Vec<f64>,
    pub best_ms: Option<f64>,
    pub worst_ms: Option<f64>,
}

/// Read-only view of a session at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub generated_at: Option<DateTime<Utc>>,
    pub deadzone_percent: u8,
    pub statistics: InputStatistics,
    pub latency: LatencySummary,
    pub history: Vec<InputEdgeEvent>,
    pub controllers: Vec<ControllerSnapshot>,
}

impl SessionReport {
    pub fn connected_count(&self) -> usize {
        self.controllers.len()
    }

    /// Multi-line plain-text summary for the console
    pub fn summary_lines(&self) -> Vec<String> {
        let stats = &self.statistics;
        let mut lines = vec![
            format!("Controllers connected : {}", self.controllers.len()),
            format!("Deadzone              : {}%", self.deadzone_percent),
            format!("Button presses        : {}", stats.total_button_presses),
            format!("Sampled time          : {:.1} s", stats.total_sampled_time_ms / 1000.0),
            format!("Max stick displacement: {:.3}", stats.max_stick_displacement),
            format!(
                "Avg reaction time     : {}",
                stats
                    .average_reaction_time_ms
                    .map(|ms| format!("{:.1} ms", ms))
                    .unwrap_or_else(|| "-".to_string())
            ),
            format!(
                "Reaction trials       : {} ({})",
                self.latency.results_ms.len(),
                if self.latency.trial.is_armed() { "armed" } else { "idle" }
            ),
        ];

        if let (Some(best), Some(worst)) = (self.latency.best_ms, self.latency.worst_ms) {
            lines.push(format!("Best / worst reaction : {:.1} / {:.1} ms", best, worst));
        }

        for (controller, counts) in &stats.per_button_press_count {
            let busiest = counts
                .iter()
                .enumerate()
                .max_by_key(|(_, &count)| count)
                .filter(|(_, &count)| count > 0);
            if let Some((button, count)) = busiest {
                lines.push(format!(
                    "Controller {} most used: button {} ({} presses)",
                    controller, button, count
                ));
            }
        }

        lines
    }
}

impl<C: Clock> SamplerSession<C> {
    /// Snapshot everything the UI layer reads
    pub fn report(&self) -> SessionReport {
        let results = self.latency_results();
        SessionReport {
            generated_at: Some(Utc::now()),
            deadzone_percent: self.deadzone_percent(),
            statistics: self.statistics().clone(),
            latency: LatencySummary {
                trial: self.latency_trial(),
                results_ms: results.samples().to_vec(),
                best_ms: results.best_ms(),
                worst_ms: results.worst_ms(),
            },
            history: self.history().to_vec(),
            controllers: self.snapshots().to_vec(),
        }
    }
}

/// Write a report as pretty JSON into `dir`, returning the file path
pub fn export_json(report: &SessionReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let stamp = report.generated_at.unwrap_or_else(Utc::now);
    let path = dir.join(format!("gamepad-report-{}.json", stamp.format("%Y%m%d-%H%M%S%.3f")));

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use crate::input::gamepad::clock::ManualClock;
    use crate::input::gamepad::frame::{RawButton, RawGamepad};
    use crate::input::gamepad::host::StaticHost;
    use tempfile::TempDir;

    fn sampled_session() -> SamplerSession<ManualClock> {
        let clock = ManualClock::new(0.0);
        let mut session = SamplerSession::new(&SamplerConfig::default(), clock.clone());
        let mut host = StaticHost::new(vec![Some(RawGamepad {
            index: 0,
            connected: true,
            id: "Report Pad".to_string(),
            buttons: Some(vec![RawButton::digital(false), RawButton::digital(true)]),
            axes: Some(vec![0.0, 0.0]),
            timestamp: 4.0,
        })]);
        session.arm_latency_trial();
        clock.advance(120.0);
        session.sample(&mut host, 16.0);
        session
    }

    #[test]
    fn test_report_reflects_session() {
        let report = sampled_session().report();

        assert_eq!(report.connected_count(), 1);
        assert_eq!(report.statistics.total_button_presses, 1);
        assert_eq!(report.latency.results_ms, vec![120.0]);
        assert_eq!(report.latency.best_ms, Some(120.0));
        assert_eq!(report.history.len(), 1);
        assert!(report.generated_at.is_some());
    }

    #[test]
    fn test_summary_mentions_busiest_button() {
        let lines = sampled_session().report().summary_lines();
        assert!(lines.iter().any(|l| l.contains("button 1 (1 presses)")));
        assert!(lines.iter().any(|l| l.contains("120.0 ms")));
    }

    #[test]
    fn test_export_writes_json() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let report = sampled_session().report();

        let path = export_json(&report, &temp_dir.path().join("exports"))?;
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

        assert_eq!(json["statistics"]["total_button_presses"], 1);
        assert_eq!(json["history"][0]["kind"], "pressed");
        assert_eq!(json["latency"]["trial"]["state"], "disarmed");
        assert_eq!(json["controllers"][0]["display_name"], "Report Pad");
        Ok(())
    }

    #[test]
    fn test_export_into_unwritable_target_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x")?;

        assert!(export_json(&SessionReport::default(), &blocker).is_err());
        Ok(())
    }
}

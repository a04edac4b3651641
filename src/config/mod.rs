//! Configuration management for Gamepad Tester
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//! Every field has a default, so an absent file or an empty document is valid.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::input::gamepad::host::{HapticEffect, HapticKind};
use crate::input::gamepad::normalize::MAX_DEADZONE_PERCENT;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Sampler session settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SamplerConfig {
    #[serde(default = "default_deadzone_percent")]
    pub deadzone_percent: u8,
    /// Upper clamp for a single frame's delta time
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: f64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            deadzone_percent: default_deadzone_percent(),
            max_delta_ms: default_max_delta_ms(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// Live polling cadence
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
        }
    }
}

/// Rumble effect played by the `rumble` command
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HapticsConfig {
    #[serde(default = "default_haptic_duration")]
    pub duration_ms: u32,
    #[serde(default = "default_magnitude")]
    pub strong_magnitude: f32,
    #[serde(default = "default_magnitude")]
    pub weak_magnitude: f32,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_haptic_duration(),
            strong_magnitude: default_magnitude(),
            weak_magnitude: default_magnitude(),
        }
    }
}

impl HapticsConfig {
    pub fn effect(&self) -> HapticEffect {
        HapticEffect {
            kind: HapticKind::DualRumble,
            duration_ms: self.duration_ms,
            strong_magnitude: self.strong_magnitude,
            weak_magnitude: self.weak_magnitude,
        }
    }
}

/// Report export settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Target directory for JSON reports (defaults to the data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    /// Parse and validate a YAML document
    pub fn parse(contents: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.sampler.deadzone_percent > MAX_DEADZONE_PERCENT {
            anyhow::bail!(
                "sampler.deadzone_percent {} is out of range (must be 0-{})",
                self.sampler.deadzone_percent,
                MAX_DEADZONE_PERCENT
            );
        }

        if !self.sampler.max_delta_ms.is_finite() || self.sampler.max_delta_ms <= 0.0 {
            anyhow::bail!(
                "sampler.max_delta_ms must be a positive number (got {})",
                self.sampler.max_delta_ms
            );
        }

        if self.sampler.history_capacity == 0 {
            anyhow::bail!("sampler.history_capacity must be at least 1");
        }

        if self.poll.interval_ms == 0 || self.poll.interval_ms > 1000 {
            anyhow::bail!(
                "poll.interval_ms {} is out of range (must be 1-1000)",
                self.poll.interval_ms
            );
        }

        for (name, magnitude) in [
            ("strong_magnitude", self.haptics.strong_magnitude),
            ("weak_magnitude", self.haptics.weak_magnitude),
        ] {
            if !(0.0..=1.0).contains(&magnitude) {
                anyhow::bail!("haptics.{} {} is out of range (must be 0.0-1.0)", name, magnitude);
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_deadzone_percent() -> u8 { 8 }
fn default_max_delta_ms() -> f64 { 100.0 }
fn default_history_capacity() -> usize { crate::input::gamepad::history::DEFAULT_HISTORY_CAPACITY }
fn default_poll_interval() -> u64 { 16 }
fn default_haptic_duration() -> u32 { 200 }
fn default_magnitude() -> f32 { 1.0 }

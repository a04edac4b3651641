//! Hot reload of the sampler configuration file

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Time to let an editor finish writing before the file is re-read
pub const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the config file and yields each changed, valid configuration.
///
/// Saves that leave the parsed config identical (whitespace, comments) and
/// files that fail validation are not forwarded.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    pub async fn new(config_path: impl Into<PathBuf>) -> Result<(Self, Arc<AppConfig>)> {
        Self::with_debounce(config_path, DEFAULT_RELOAD_DEBOUNCE).await
    }

    pub async fn with_debounce(
        config_path: impl Into<PathBuf>,
        debounce: Duration,
    ) -> Result<(Self, Arc<AppConfig>)> {
        let config_path = config_path.into();
        let (tx, rx) = mpsc::channel(10);

        let initial = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;
        let current = Arc::new(Mutex::new(initial.clone()));

        // notify calls back on its own thread, outside the runtime
        let runtime = tokio::runtime::Handle::current();
        let watched = config_path.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Config watch error: {}", e);
                    return;
                },
            };
            if !is_reload_event(&event.kind) {
                return;
            }
            debug!("Config file event {:?}: {:?}", event.kind, event.paths);

            let path = watched.clone();
            let current = current.clone();
            let tx = tx.clone();
            runtime.spawn(async move {
                tokio::time::sleep(debounce).await;
                match AppConfig::load(&path).await {
                    Ok(new_config) => {
                        {
                            let mut current = current.lock();
                            if *current == new_config {
                                debug!("Config file saved without changes");
                                return;
                            }
                            *current = new_config.clone();
                        }
                        info!("Configuration reloaded");
                        if let Err(e) = tx.send(new_config).await {
                            error!("Failed to deliver config update: {}", e);
                        }
                    },
                    Err(e) => warn!("Config reload rejected, keeping current settings: {:#}", e),
                }
            });
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path.display()))?;

        info!("Watching {} for changes", config_path.display());

        Ok((Self { _watcher: watcher, rx }, Arc::new(initial)))
    }

    /// Next changed configuration, or `None` once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}

/// Content writes and replace-by-rename saves trigger a reload; metadata
/// and access events do not.
fn is_reload_event(kind: &EventKind) -> bool {
    match kind {
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        EventKind::Create(CreateKind::File | CreateKind::Any) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, DataChange, MetadataKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reload_event_filter() {
        assert!(is_reload_event(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(is_reload_event(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_reload_event(&EventKind::Create(CreateKind::File)));
        assert!(!is_reload_event(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))));
        assert!(!is_reload_event(&EventKind::Access(AccessKind::Any)));
        assert!(!is_reload_event(&EventKind::Remove(RemoveKind::File)));
    }

    #[tokio::test]
    async fn test_changed_config_is_delivered() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test-config.yaml");
        fs::write(&config_path, "sampler:\n  deadzone_percent: 10\n")?;

        let (mut watcher, config) =
            ConfigWatcher::with_debounce(&config_path, Duration::from_millis(50)).await?;
        assert_eq!(config.sampler.deadzone_percent, 10);

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "sampler:\n  deadzone_percent: 22\n")?;

        let new_config = tokio::time::timeout(Duration::from_secs(2), watcher.next_config()).await?;
        if let Some(new_config) = new_config {
            assert_eq!(new_config.sampler.deadzone_percent, 22);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_or_invalid_saves_are_dropped() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test-config.yaml");
        fs::write(&config_path, "sampler:\n  deadzone_percent: 10\n")?;

        let (mut watcher, _) =
            ConfigWatcher::with_debounce(&config_path, Duration::from_millis(20)).await?;

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "# same settings\nsampler:\n  deadzone_percent: 10\n")?;
        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "sampler:\n  deadzone_percent: 99\n")?;

        let delivered = tokio::time::timeout(Duration::from_millis(500), watcher.next_config()).await;
        assert!(delivered.is_err(), "no reload expected, got {:?}", delivered);

        Ok(())
    }
}

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::Config;

/// Live-reloadable configuration holder.
///
/// Wraps `Config` in an `ArcSwap` so readers never block and writers
/// atomically swap the pointer. [`ConfigHandle::watch`] polls the file and
/// calls [`ConfigHandle::reload`] when it changes on disk.
pub struct ConfigHandle {
    inner: Arc<ArcSwap<Config>>,
    path: PathBuf,
}

impl ConfigHandle {
    /// Create a new handle seeded with `config`.
    pub fn new(config: Config) -> Self {
        let path = config.config_path.clone();
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path,
        }
    }

    /// Load current config snapshot. Lock-free.
    pub fn load(&self) -> arc_swap::Guard<Arc<Config>> {
        self.inner.load()
    }

    /// Return a clone of the current `Arc<Config>`.
    pub fn load_full(&self) -> Arc<Config> {
        self.inner.load_full()
    }

    /// Reload config from disk, atomically swapping the active snapshot.
    ///
    /// Returns the names of the options whose value changed. On a parse or
    /// validation error the previous snapshot stays active.
    pub fn reload(&self) -> anyhow::Result<Vec<&'static str>> {
        let fresh = Config::load_from(&self.path)?;
        let previous = self.inner.load_full();
        let changed = previous.options.changed(&fresh.options);
        self.inner.store(Arc::new(fresh));
        for option in &changed {
            tracing::info!(option, "option changed");
        }
        tracing::debug!(path = %self.path.display(), "config hot-reloaded");
        Ok(changed)
    }

    /// Manually swap in a new config (e.g. after programmatic mutation).
    pub fn store(&self, config: Config) {
        self.inner.store(Arc::new(config));
    }

    /// Config file path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Poll the config file every `interval` and reload it when its
    /// modification time moves. `on_change` runs after every successful
    /// reload that changed at least one option. Runs until the task is dropped.
    pub async fn watch<F>(self, interval: Duration, on_change: F)
    where
        F: Fn(&Config, &[&'static str]) + Send,
    {
        let mut last_seen = modified_at(&self.path);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let current = modified_at(&self.path);
            if current == last_seen {
                continue;
            }
            last_seen = current;
            match self.reload() {
                Ok(changed) if !changed.is_empty() => on_change(&self.load(), &changed),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "config reload failed");
                }
            }
        }
    }
}

impl Clone for ConfigHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            path: self.path.clone(),
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

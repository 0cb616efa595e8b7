//! Configuration file watcher for hot reload of the route map.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::NavigatorConfig;

/// Watches a config file and publishes every valid new version.
///
/// Invalid edits are logged and dropped; the last good config stays active.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<NavigatorConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of the update channel.
    /// The receiver applies each config with `RouteResolver::replace`.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<NavigatorConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                updates,
            },
            rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, updates } = self;
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    reload(&reload_path, &updates);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Route map watcher started");
        Ok(watcher)
    }
}

fn reload(path: &Path, updates: &mpsc::UnboundedSender<NavigatorConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(path = ?path, routes = config.routes.len(), "Config change detected");
            if updates.send(config).is_err() {
                tracing::debug!("No route map listener; config update dropped");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config; keeping current route map");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_forwards_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.toml");
        std::fs::write(&path, "[[routes]]\npath = \"main\"").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        reload(&path, &tx);
        assert_eq!(rx.try_recv().unwrap().routes[0].path, "main");
    }

    #[test]
    fn test_reload_drops_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.toml");
        std::fs::write(&path, "[[routes]]\npath = \"\"").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        reload(&path, &tx);
        assert!(rx.try_recv().is_err());
    }
}

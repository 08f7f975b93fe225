//! Hot reload of the gateway configuration file.
//!
//! The parent directory is watched rather than the file itself, so a save
//! that replaces the file (write to temp, rename over) is still seen. Editors
//! usually emit several events per save; a reload is forwarded only when the
//! loaded configuration differs from the last one sent.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Watches one configuration file and sends each changed, valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GatewayConfig,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// `current` is the configuration already in use; reloading it unchanged
    /// sends nothing.
    pub fn new(
        path: &Path,
        current: GatewayConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            current,
            update_tx,
        } = self;

        let file_name: OsString = path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| notify::Error::path_not_found().add_path(path.clone()))?;
        let directory = watch_directory(&path);
        let mut last = Some(current);
        let config_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_config(&event, &file_name) => match load_config(&config_path) {
                    Ok(loaded) => {
                        if let Some(update) = next_update(&mut last, loaded) {
                            tracing::info!(path = ?config_path, "Configuration changed, applying");
                            if update_tx.send(update).is_err() {
                                tracing::debug!("Config update receiver dropped");
                            }
                        } else {
                            tracing::debug!(path = ?config_path, "Configuration unchanged");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reload failed, keeping current configuration");
                    }
                },
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, directory = ?directory, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True for a create or modify event on the configuration file.
fn touches_config(event: &Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}

/// Returns `loaded` when it differs from the last revision sent.
fn next_update(last: &mut Option<GatewayConfig>, loaded: GatewayConfig) -> Option<GatewayConfig> {
    if last.as_ref() == Some(&loaded) {
        return None;
    }
    *last = Some(loaded.clone());
    Some(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use notify::EventKind;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_config_matches_file_name() {
        let name = OsStr::new("gateway.toml");
        assert!(touches_config(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/gw/gateway.toml"),
            name
        ));
        assert!(touches_config(
            &event(EventKind::Create(CreateKind::File), "/etc/gw/gateway.toml"),
            name
        ));
    }

    #[test]
    fn test_touches_config_ignores_siblings_and_reads() {
        let name = OsStr::new("gateway.toml");
        assert!(!touches_config(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/gw/gateway.toml.swp"),
            name
        ));
        assert!(!touches_config(
            &event(EventKind::Access(AccessKind::Any), "/etc/gw/gateway.toml"),
            name
        ));
    }

    #[test]
    fn test_next_update_skips_unchanged() {
        let current = GatewayConfig::default();
        let mut last = Some(current.clone());
        assert!(next_update(&mut last, current.clone()).is_none());

        let mut changed = current;
        changed.settings.notoken_api = true;
        let sent = next_update(&mut last, changed.clone());
        assert_eq!(sent, Some(changed.clone()));
        assert!(next_update(&mut last, changed).is_none());
    }

    #[test]
    fn test_watch_directory_for_bare_file_name() {
        assert_eq!(watch_directory(Path::new("gateway.toml")), PathBuf::from("."));
        assert_eq!(
            watch_directory(Path::new("/etc/gw/gateway.toml")),
            PathBuf::from("/etc/gw")
        );
    }
}

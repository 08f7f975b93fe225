//! Shared runtime settings.
//!
//! Readers take an atomic snapshot for the duration of a closure and never
//! block writers. A reload swaps the whole `WebSettings` value.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::WebSettings;

/// Lock-free store for the settings every API call consults.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<ArcSwap<WebSettings>>,
}

impl SettingsStore {
    pub fn new(settings: WebSettings) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(settings)),
        }
    }

    /// Run `f` against the current snapshot. The snapshot is released when
    /// `f` returns, so callers should extract what they need and return it.
    pub fn read<R>(&self, f: impl FnOnce(&WebSettings) -> R) -> R {
        let guard = self.inner.load();
        f(&guard)
    }

    /// Replace the settings. In-flight readers keep their old snapshot.
    pub fn update(&self, settings: WebSettings) {
        self.inner.store(Arc::new(settings));
        tracing::info!("Web settings updated");
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(WebSettings::default())
    }
}

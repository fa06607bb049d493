//! Cache-only mode toggle
//!
//! [`CacheModeFlag`] owns the process-wide switch; every pipeline holds a
//! [`ModeGate`] that reads the latest published value. Reads are synchronous
//! snapshots, so blocking and async pipelines use the same call.

use tokio::sync::watch;

/// Owner of the cache-only toggle.
///
/// Publishing a value is visible to every gate immediately; there is no
/// debouncing and gates keep no copy of their own.
#[derive(Debug)]
pub struct CacheModeFlag {
    tx: watch::Sender<bool>,
}

impl CacheModeFlag {
    pub fn new(cache_only: bool) -> Self {
        let (tx, _rx) = watch::channel(cache_only);
        Self { tx }
    }

    /// Publish a new value
    pub fn set(&self, cache_only: bool) {
        let previous = self.tx.send_replace(cache_only);
        if previous != cache_only {
            log::debug!("Cache-only mode {}", if cache_only { "on" } else { "off" });
        }
    }

    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    /// Hand out a read-only view for a pipeline
    pub fn gate(&self) -> ModeGate {
        ModeGate {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CacheModeFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Read side of the cache-only toggle
#[derive(Debug, Clone)]
pub struct ModeGate {
    rx: watch::Receiver<bool>,
}

impl ModeGate {
    /// A gate pinned to one value, for callers without a shared flag
    pub fn fixed(cache_only: bool) -> Self {
        let (_tx, rx) = watch::channel(cache_only);
        Self { rx }
    }

    /// Current value of the flag at the moment of the call
    pub fn is_cache_only_mode_active(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the owner publishes a different value and return it.
    ///
    /// Returns `None` once the owning flag has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

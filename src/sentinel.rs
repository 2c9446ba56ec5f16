//! Adapter over a viewport-intersection primitive.

use std::sync::{Arc, Mutex};

/// Callback invoked when the sentinel element becomes visible.
pub type SentinelCallback = Arc<dyn Fn() + Send + Sync>;

/// An end-of-list marker whose visibility can be observed.
///
/// Hosts wire this to whatever intersection machinery they have; the
/// pipeline only needs "tell me when the marker is on screen". No
/// business logic lives behind this trait.
pub trait Sentinel: Send + Sync {
    /// Registers the callback to run whenever the sentinel becomes visible.
    fn observe(&self, on_visible: SentinelCallback);

    /// Stops watching; called on view teardown.
    fn disconnect(&self);
}

/// A sentinel driven by explicit calls, for tests and terminal hosts.
#[derive(Default)]
pub struct ManualSentinel {
    on_visible: Mutex<Option<SentinelCallback>>,
}

impl ManualSentinel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the sentinel scrolling into view.
    pub fn enter_viewport(&self) {
        // Clone out so the callback runs without the lock held.
        let callback = self.on_visible.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Sentinel for ManualSentinel {
    fn observe(&self, on_visible: SentinelCallback) {
        *self.on_visible.lock().unwrap() = Some(on_visible);
    }

    fn disconnect(&self) {
        self.on_visible.lock().unwrap().take();
    }
}

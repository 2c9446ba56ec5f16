//! Scroll-trigger controller for infinite scrolling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::filters::FilterHandle;
use crate::sentinel::Sentinel;

/// Gates the end-of-list sentinel so that scrolling loads the next page
/// exactly once per completed fetch.
///
/// The trigger is armed after a fetch completes with more pages available
/// and idle while a fetch is in flight or pagination is exhausted. A
/// sentinel hit while armed advances the page once and returns the
/// trigger to idle until the resulting fetch completes.
pub struct ScrollTrigger {
    armed: AtomicBool,
    filters: FilterHandle,
}

impl ScrollTrigger {
    pub(crate) fn new(filters: FilterHandle) -> Arc<Self> {
        Arc::new(Self {
            armed: AtomicBool::new(false),
            filters,
        })
    }

    /// Wires this trigger to a sentinel adapter.
    pub fn attach(self: &Arc<Self>, sentinel: &dyn Sentinel) {
        let trigger = Arc::clone(self);
        sentinel.observe(Arc::new(move || trigger.on_intersect()));
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub(crate) fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    /// Sentinel callback.
    ///
    /// The swap makes arm-check and disarm one step, so a burst of
    /// intersection events advances the page at most once.
    pub fn on_intersect(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.filters.advance_page();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::ManualSentinel;

    #[test]
    fn idle_trigger_ignores_intersections() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_page(0);
        let trigger = ScrollTrigger::new(handle.clone());

        trigger.on_intersect();
        assert_eq!(handle.snapshot().page, 0);
    }

    #[test]
    fn armed_trigger_advances_once() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_page(0);
        let trigger = ScrollTrigger::new(handle.clone());

        trigger.arm();
        trigger.on_intersect();
        trigger.on_intersect();
        assert_eq!(handle.snapshot().page, 1);
        assert!(!trigger.is_armed());
    }

    #[test]
    fn disarm_wins_over_pending_intersection() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_page(0);
        let trigger = ScrollTrigger::new(handle.clone());

        trigger.arm();
        trigger.disarm();
        trigger.on_intersect();
        assert_eq!(handle.snapshot().page, 0);
    }

    #[test]
    fn attaches_to_a_sentinel() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_page(0);
        let trigger = ScrollTrigger::new(handle.clone());
        let sentinel = ManualSentinel::new();
        trigger.attach(&sentinel);

        sentinel.enter_viewport();
        assert_eq!(handle.snapshot().page, 0);

        trigger.arm();
        sentinel.enter_viewport();
        assert_eq!(handle.snapshot().page, 1);
    }
}

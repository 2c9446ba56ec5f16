//! Filter/sort state for one catalog view.

use pageturner_core::SortOrder;
use tokio::sync::watch;

/// Page index used before any page has been requested.
///
/// Keeping the initial value below the first valid page makes the first
/// transition into page 0 a detectable event of its own.
pub const PAGE_UNLOADED: i32 = -1;

/// The current search/tag/sort/page tuple of a catalog view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Substring search over entry names; empty means no filter.
    pub search: String,
    /// Selected tags; an entry matches when it carries any of them.
    pub tags: Vec<String>,
    /// Result ordering.
    pub order: SortOrder,
    /// Zero-indexed page, [`PAGE_UNLOADED`] before the first request.
    pub page: i32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            tags: Vec::new(),
            order: SortOrder::default(),
            page: PAGE_UNLOADED,
        }
    }
}

/// Handle for mutating the filter state of a feed.
///
/// Every setter notifies the feed worker synchronously; debouncing and
/// duplicate suppression are the worker's job, not this type's. Cloning
/// the handle gives another writer over the same state.
#[derive(Clone)]
pub struct FilterHandle {
    tx: watch::Sender<FilterState>,
}

impl FilterHandle {
    pub(crate) fn channel() -> (Self, watch::Receiver<FilterState>) {
        let (tx, rx) = watch::channel(FilterState::default());
        (Self { tx }, rx)
    }

    /// Sets the search text and starts a new result generation from page 0.
    ///
    /// An empty string is a valid "no filter" value.
    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.tx.send_modify(|state| {
            state.search = search;
            state.page = 0;
        });
    }

    /// Replaces the full tag selection.
    ///
    /// Resets to page 0 only when a page beyond the first has been
    /// requested, so changing tags before the first load does not force a
    /// redundant reset.
    pub fn set_tags(&self, tags: Vec<String>) {
        self.tx.send_modify(|state| {
            state.tags = tags;
            if state.page > 0 {
                state.page = 0;
            }
        });
    }

    /// Changes the result ordering, with the same reset rule as tags.
    pub fn set_order(&self, order: SortOrder) {
        self.tx.send_modify(|state| {
            state.order = order;
            if state.page > 0 {
                state.page = 0;
            }
        });
    }

    /// Moves to the next page.
    ///
    /// Called by the scroll trigger or an explicit "load more" control.
    pub fn advance_page(&self) {
        self.tx.send_modify(|state| state.page += 1);
    }

    /// Absolute page set; `set_page(0)` forces a first-page load.
    pub fn set_page(&self, page: i32) {
        self.tx.send_modify(|state| state.page = page);
    }

    /// The current filter tuple.
    pub fn snapshot(&self) -> FilterState {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unloaded() {
        let (handle, _rx) = FilterHandle::channel();
        assert_eq!(handle.snapshot().page, PAGE_UNLOADED);
    }

    #[test]
    fn search_always_resets_page() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_search("math");
        assert_eq!(handle.snapshot().page, 0);

        handle.set_page(3);
        handle.set_search("maths");
        let state = handle.snapshot();
        assert_eq!(state.search, "maths");
        assert_eq!(state.page, 0);
    }

    #[test]
    fn tags_reset_only_past_first_page() {
        let (handle, _rx) = FilterHandle::channel();

        // Before the first load the sentinel stays put.
        handle.set_tags(vec!["stem".into()]);
        assert_eq!(handle.snapshot().page, PAGE_UNLOADED);

        handle.set_page(0);
        handle.set_tags(vec!["craft".into()]);
        assert_eq!(handle.snapshot().page, 0);

        handle.advance_page();
        handle.advance_page();
        assert_eq!(handle.snapshot().page, 2);
        handle.set_tags(vec!["digital".into()]);
        assert_eq!(handle.snapshot().page, 0);
    }

    #[test]
    fn order_follows_tag_reset_rule() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_page(2);
        handle.set_order(SortOrder::CreatedDesc);
        let state = handle.snapshot();
        assert_eq!(state.order, SortOrder::CreatedDesc);
        assert_eq!(state.page, 0);
    }

    #[test]
    fn advance_increments() {
        let (handle, _rx) = FilterHandle::channel();
        handle.set_page(0);
        handle.advance_page();
        assert_eq!(handle.snapshot().page, 1);
    }
}

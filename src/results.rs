//! Accumulation of fetched pages into the displayed list.

use pageturner_core::Page;

/// The accumulated, displayed state of a catalog listing.
///
/// `items` is exactly the concatenation of the pages received for the
/// current filter generation, in arrival order; `total` and `has_next`
/// mirror the most recently applied page. Renders are a pure function of
/// this value.
#[derive(Debug, Clone)]
pub struct ResultSet<T> {
    pub items: Vec<T>,
    pub total: u32,
    pub has_next: bool,
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            has_next: false,
        }
    }
}

impl<T> ResultSet<T> {
    /// Folds one fetched page in.
    ///
    /// A first page replaces the list wholesale, starting a new
    /// generation; any other page appends.
    pub fn apply(&mut self, page: Page<T>) {
        if page.first {
            self.items = page.items;
        } else {
            self.items.extend(page.items);
        }
        self.total = page.total;
        self.has_next = page.has_next;
    }
}

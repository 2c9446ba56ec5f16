//! The catalog feed: query composition, sequencing, and accumulation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, warn};

use pageturner_core::{Page, QuerySpec};

use crate::filters::{FilterHandle, FilterState};
use crate::results::ResultSet;
use crate::scroll::ScrollTrigger;
use crate::source::CatalogSource;

/// Tuning for one catalog feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Items per fetched page.
    pub page_size: u32,
    /// Quiet period between the last filter edit and the fetch it causes.
    pub debounce: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            debounce: Duration::from_millis(400),
        }
    }
}

/// An infinite-scroll catalog feed over one [`CatalogSource`].
///
/// The feed owns the filter state, the accumulated result set, and the
/// scroll trigger. A single worker loop ([`CatalogFeed::run`]) turns
/// filter edits into a strictly ordered sequence of page fetches:
/// debounced, deduplicated, and never more than one in flight.
///
/// Typical wiring:
///
/// ```ignore
/// let feed = CatalogFeed::new(source, FeedConfig::default());
/// let filters = feed.filters();
/// let mut results = feed.results();
/// feed.scroll_trigger().attach(&sentinel);
/// tokio::spawn(feed.run());
///
/// filters.set_search("math"); // debounced, fetches page 0
/// results.changed().await?;   // render from results.borrow()
/// ```
pub struct CatalogFeed<T, S> {
    source: S,
    config: FeedConfig,
    handle: FilterHandle,
    filters: watch::Receiver<FilterState>,
    results: watch::Sender<ResultSet<T>>,
    trigger: Arc<ScrollTrigger>,
}

impl<T, S> CatalogFeed<T, S>
where
    T: Send + Sync + 'static,
    S: CatalogSource<T>,
{
    pub fn new(source: S, config: FeedConfig) -> Self {
        let (handle, filters) = FilterHandle::channel();
        let (results, _) = watch::channel(ResultSet::default());
        let trigger = ScrollTrigger::new(handle.clone());
        Self {
            source,
            config,
            handle,
            filters,
            results,
            trigger,
        }
    }

    /// Handle for mutating search, tags, sort, and page.
    pub fn filters(&self) -> FilterHandle {
        self.handle.clone()
    }

    /// Receiver for the accumulated result set.
    ///
    /// Renders are a pure function of the received value. Take at least
    /// one receiver before spawning [`CatalogFeed::run`]; the worker
    /// treats "no subscribers left" as view teardown.
    pub fn results(&self) -> watch::Receiver<ResultSet<T>> {
        self.results.subscribe()
    }

    /// The scroll trigger, to be attached to a sentinel adapter.
    pub fn scroll_trigger(&self) -> Arc<ScrollTrigger> {
        Arc::clone(&self.trigger)
    }

    /// Runs the feed worker until the last results receiver is dropped.
    ///
    /// One loop iteration per accepted filter tuple. Fetches are
    /// sequenced, not cancelled: a tuple arriving while a fetch is in
    /// flight waits behind it, and the stale result is applied first and
    /// then superseded. Intermediate tuples that pile up during a fetch
    /// collapse to the latest one.
    pub async fn run(mut self) {
        let mut last: Option<FilterState> = None;
        loop {
            tokio::select! {
                changed = self.filters.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = self.results.closed() => break,
            }

            // Trailing debounce: keep absorbing edits until a quiet
            // period passes without one.
            loop {
                match time::timeout(self.config.debounce, self.filters.changed()).await {
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) => return,
                    Err(_) => break,
                }
            }

            // A filter edit can land in the same tick as teardown and win
            // the select above; never start new work for a dead view.
            if self.results.is_closed() {
                break;
            }

            let state = self.filters.borrow_and_update().clone();
            if state.page < 0 {
                // Nothing requested yet.
                continue;
            }
            if last.as_ref() == Some(&state) {
                // Redundant notification.
                continue;
            }

            self.trigger.disarm();
            let query = QuerySpec {
                offset: state.page as u32 * self.config.page_size,
                limit: self.config.page_size,
                search: (!state.search.is_empty()).then(|| state.search.clone()),
                tags: state.tags.clone(),
                order: state.order,
            };
            debug!(page = state.page, offset = query.offset, "issuing catalog fetch");

            let page = match self.source.fetch_page(&query).await {
                Ok(envelope) => Page::from_envelope(envelope),
                Err(err) => {
                    warn!(page = state.page, error = %err, "catalog fetch failed, folding in an empty page");
                    Page::empty(query.offset == 0)
                }
            };

            last = Some(state);
            let has_next = page.has_next;
            self.results.send_modify(|set| set.apply(page));
            if has_next {
                self.trigger.arm();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pageturner_core::{Envelope, SortOrder};

    use super::*;
    use crate::error::{Error, Result};
    use crate::sentinel::ManualSentinel;

    /// Serves `0..total` in offset order, with a configurable in-fetch
    /// delay and failure switch. Records every request it sees.
    struct MockSource {
        total: u32,
        delay: Duration,
        fail: AtomicBool,
        requests: Mutex<Vec<QuerySpec>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockSource {
        fn new(total: u32, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                total,
                delay: Duration::from_millis(delay_ms),
                fail: AtomicBool::new(false),
                requests: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }

        fn requests(&self) -> Vec<QuerySpec> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogSource<u32> for MockSource {
        async fn fetch_page(&self, query: &QuerySpec) -> Result<Envelope<u32>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(query.clone());

            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Status {
                    endpoint: "badges".into(),
                    status: 500,
                });
            }

            let start = query.offset.min(self.total);
            let end = (query.offset + query.limit).min(self.total);
            Ok(Envelope {
                count: self.total,
                next: (end < self.total).then(|| format!("?offset={end}")),
                previous: (query.offset > 0).then(|| "?offset=0".to_string()),
                results: (start..end).collect(),
            })
        }
    }

    fn feed_over(source: &Arc<MockSource>) -> CatalogFeed<u32, Arc<MockSource>> {
        CatalogFeed::new(Arc::clone(source), FeedConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_search_edits_collapse_to_one_fetch() {
        let source = MockSource::new(45, 10);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let _results = feed.results();
        tokio::spawn(feed.run());

        for text in ["m", "ma", "mat", "math"] {
            filters.set_search(text);
            time::sleep(Duration::from_millis(100)).await;
        }
        time::sleep(Duration::from_secs(1)).await;

        let requests = source.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].search.as_deref(), Some("math"));
        assert_eq!(requests[0].offset, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn identical_sort_value_is_suppressed() {
        let source = MockSource::new(45, 10);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let _results = feed.results();
        tokio::spawn(feed.run());

        filters.set_page(0);
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.requests().len(), 1);

        filters.set_order(SortOrder::CreatedDesc);
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.requests().len(), 2);

        filters.set_order(SortOrder::CreatedDesc);
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_fetched_before_the_first_page_request() {
        let source = MockSource::new(45, 10);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let _results = feed.results();
        tokio::spawn(feed.run());

        filters.set_tags(vec!["stem".into()]);
        filters.set_order(SortOrder::NameDesc);
        time::sleep(Duration::from_secs(1)).await;

        assert!(source.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_appends_until_pagination_is_exhausted() {
        let source = MockSource::new(45, 10);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let results = feed.results();
        let trigger = feed.scroll_trigger();
        let sentinel = ManualSentinel::new();
        trigger.attach(&sentinel);
        tokio::spawn(feed.run());

        filters.set_page(0);
        time::sleep(Duration::from_millis(600)).await;
        {
            let set = results.borrow();
            assert_eq!(set.items.len(), 20);
            assert_eq!(set.total, 45);
            assert!(set.has_next);
        }
        assert!(trigger.is_armed());

        sentinel.enter_viewport();
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(results.borrow().items.len(), 40);

        sentinel.enter_viewport();
        time::sleep(Duration::from_millis(600)).await;
        {
            let set = results.borrow();
            assert_eq!(set.items.len(), 45);
            assert_eq!(set.items[44], 44);
            assert!(!set.has_next);
        }
        assert!(!trigger.is_armed());

        // Exhausted: further scrolling is inert.
        sentinel.enter_viewport();
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_resets_to_a_replaced_first_page() {
        let source = MockSource::new(45, 10);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let results = feed.results();
        let trigger = feed.scroll_trigger();
        let sentinel = ManualSentinel::new();
        trigger.attach(&sentinel);
        tokio::spawn(feed.run());

        filters.set_page(0);
        time::sleep(Duration::from_millis(600)).await;
        sentinel.enter_viewport();
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(results.borrow().items.len(), 40);

        filters.set_search("math");
        time::sleep(Duration::from_millis(600)).await;

        // Replaced, not appended.
        assert_eq!(results.borrow().items.len(), 20);
        let offsets: Vec<u32> = source.requests().iter().map(|q| q.offset).collect();
        assert_eq!(offsets, vec![0, 20, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_never_overlap() {
        // Fetch takes longer than the debounce window, so a filter edit
        // lands while the previous fetch is still in flight.
        let source = MockSource::new(45, 300);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let results = feed.results();
        tokio::spawn(feed.run());

        filters.set_page(0);
        time::sleep(Duration::from_millis(450)).await;
        filters.set_search("math");
        time::sleep(Duration::from_secs(2)).await;

        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].search.as_deref(), Some("math"));
        assert_eq!(requests[1].offset, 0);
        assert_eq!(results.borrow().items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_results_receiver_stops_the_worker() {
        let source = MockSource::new(45, 10);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let results = feed.results();
        let worker = tokio::spawn(feed.run());

        filters.set_page(0);
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.requests().len(), 1);

        // Teardown and a filter edit in the same tick: the edit must not
        // produce a fetch for a view that no longer exists.
        drop(results);
        filters.set_search("math");
        time::sleep(Duration::from_secs(1)).await;

        assert_eq!(source.requests().len(), 1);
        assert!(worker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_downgrades_to_an_empty_page() {
        let source = MockSource::new(45, 10);
        source.fail.store(true, Ordering::SeqCst);
        let feed = feed_over(&source);
        let filters = feed.filters();
        let results = feed.results();
        let trigger = feed.scroll_trigger();
        tokio::spawn(feed.run());

        filters.set_page(0);
        time::sleep(Duration::from_millis(600)).await;
        {
            let set = results.borrow();
            assert!(set.items.is_empty());
            assert!(!set.has_next);
        }
        assert!(!trigger.is_armed());

        // The pipeline stays usable: the next filter change fetches again.
        source.fail.store(false, Ordering::SeqCst);
        filters.set_search("retry");
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(results.borrow().items.len(), 20);
        assert!(results.borrow().has_next);
    }
}

//! Infinite-scroll catalog browsing pipeline for a digital-badge platform.
//!
//! Badge, issuer, and learning-pathway catalogs are fetched page by page
//! from an offset-paginated REST backend. The pipeline turns raw UI
//! events (search edits, tag picks, sort changes, scrolling) into a
//! strictly ordered sequence of page fetches and folds the responses into
//! one displayable result set:
//!
//! - [`filters::FilterHandle`] holds the current search/tag/sort/page tuple
//! - [`feed::CatalogFeed`] debounces, deduplicates, and sequences fetches
//!   against a [`source::CatalogSource`]
//! - [`results::ResultSet`] accumulates pages (replace on first, append after)
//! - [`scroll::ScrollTrigger`] plus a [`sentinel::Sentinel`] adapter drive
//!   infinite scroll without duplicate loads
//!
//! # Example
//!
//! ```ignore
//! use pageturner::{CatalogFeed, FeedConfig, HttpSource};
//! use pageturner_core::BadgeSummary;
//!
//! let source = HttpSource::new("http://localhost:8000/api/v1", "badges");
//! let feed: CatalogFeed<BadgeSummary, _> = CatalogFeed::new(source, FeedConfig::default());
//! let filters = feed.filters();
//! let mut results = feed.results();
//! tokio::spawn(feed.run());
//!
//! filters.set_search("math");
//! // results.changed().await, then render from results.borrow()
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod filters;
pub mod results;
pub mod scroll;
pub mod sentinel;
pub mod source;

pub use error::{Error, Result};
pub use feed::{CatalogFeed, FeedConfig};
pub use filters::{FilterHandle, FilterState, PAGE_UNLOADED};
pub use results::ResultSet;
pub use scroll::ScrollTrigger;
pub use sentinel::{ManualSentinel, Sentinel, SentinelCallback};
pub use source::http::HttpSource;
pub use source::CatalogSource;

//! Core types for the pageturner catalog client.
//!
//! This crate provides the shared data types used by the catalog browsing
//! pipeline and by anything that speaks the same offset-paginated wire
//! format (for example the mock server shipped with the workspace).
//!
//! # Overview
//!
//! The main types are:
//!
//! - [`Envelope`] - The raw paginated REST response
//! - [`Page`] - The decoded view of one fetched page
//! - [`QuerySpec`] - One concrete page request (offset, limit, filters)
//! - [`SortOrder`] - Catalog ordering options and their backend parameters
//! - [`BadgeSummary`], [`IssuerSummary`], [`PathwaySummary`] - Catalog entries
//!
//! # Example
//!
//! Fetching one page of badges from a catalog backend:
//!
//! ```ignore
//! use pageturner_core::{BadgeSummary, Envelope};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//!
//! let envelope: Envelope<BadgeSummary> = client
//!     .get("http://localhost:8000/api/v1/badges?offset=0&limit=21")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//!
//! for badge in &envelope.results {
//!     println!("{} ({})", badge.name, badge.issuer_name);
//! }
//! # Ok(())
//! # }
//! ```

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// The raw shape of one paginated REST response.
///
/// `previous == None` marks the first page of a result set; `next == None`
/// marks the last. The link values themselves are opaque to the client,
/// which paginates by offset rather than by following them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Total number of items matching the query, across all pages.
    pub count: u32,
    /// Link to the next page, absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
    /// Link to the previous page, absent on the first page.
    #[serde(default)]
    pub previous: Option<String>,
    /// The items in this page.
    pub results: Vec<T>,
}

/// The decoded view of one fetched page.
///
/// # Example
///
/// ```
/// use pageturner_core::{Envelope, Page};
///
/// let envelope = Envelope {
///     count: 45,
///     next: Some("/api/v1/badges?offset=20&limit=20".into()),
///     previous: None,
///     results: vec!["a", "b"],
/// };
/// let page = Page::from_envelope(envelope);
///
/// assert!(page.first);
/// assert!(page.has_next);
/// assert_eq!(page.total, 45);
/// ```
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total number of items matching the query.
    pub total: u32,
    /// Whether this is the first page of a new result set.
    pub first: bool,
    /// Whether more pages exist after this one.
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Decodes a wire envelope into a page.
    ///
    /// `first` is derived from the absence of a `previous` link and
    /// `has_next` from the presence of a `next` link.
    pub fn from_envelope(envelope: Envelope<T>) -> Self {
        Self {
            first: envelope.previous.is_none(),
            has_next: envelope.next.is_some(),
            total: envelope.count,
            items: envelope.results,
        }
    }

    /// An empty page carrying no items and ending pagination.
    ///
    /// Used when a fetch fails and is downgraded rather than propagated.
    pub fn empty(first: bool) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            first,
            has_next: false,
        }
    }
}

/// Catalog ordering options.
///
/// The backend takes a single `ordering` parameter: the bare field name
/// for ascending order, prefixed with `-` for descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    CreatedAsc,
    CreatedDesc,
}

impl SortOrder {
    /// The backend `ordering` parameter value.
    pub fn ordering_param(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name",
            SortOrder::NameDesc => "-name",
            SortOrder::CreatedAsc => "created_at",
            SortOrder::CreatedDesc => "-created_at",
        }
    }
}

/// One concrete page request against a catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Number of items to skip: `page * limit`.
    pub offset: u32,
    /// Page size.
    pub limit: u32,
    /// Substring search over entry names, `None` for no filter.
    pub search: Option<String>,
    /// Tag filter; an entry matches when it carries any of these.
    pub tags: Vec<String>,
    /// Result ordering.
    pub order: SortOrder,
}

impl QuerySpec {
    /// The query-string pairs for this request.
    ///
    /// `name` and `tags` are omitted when empty; `tags` is a comma-joined
    /// list.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            if !search.is_empty() {
                pairs.push(("name", search.clone()));
            }
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        pairs.push(("ordering", self.order.ordering_param().to_string()));
        pairs
    }
}

/// One badge in a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeSummary {
    /// Unique badge identifier.
    pub id: String,
    /// Human-readable badge name.
    pub name: String,
    /// Short description of the competency the badge attests.
    pub description: String,
    /// Badge image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Name of the issuing organisation.
    pub issuer_name: String,
    /// Competency tags attached to the badge.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the badge class was created.
    pub created_at: Timestamp,
}

/// One issuer in a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerSummary {
    /// Unique issuer identifier.
    pub id: String,
    /// Organisation name.
    pub name: String,
    /// Short description of the organisation.
    pub description: String,
    /// Issuer logo URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Municipality the issuer belongs to.
    #[serde(default)]
    pub city: Option<String>,
    /// Number of badge classes published by this issuer.
    pub badge_count: u32,
    /// When the issuer joined the platform.
    pub created_at: Timestamp,
}

/// One learning pathway in a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwaySummary {
    /// Unique pathway identifier.
    pub id: String,
    /// Pathway name.
    pub name: String,
    /// Short description of the learning goal.
    pub description: String,
    /// Competency tags covered by the pathway.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of badges earned along the pathway.
    pub badge_count: u32,
    /// When the pathway was published.
    pub created_at: Timestamp,
}

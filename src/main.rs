use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pageturner::config::Config;
use pageturner::feed::{CatalogFeed, FeedConfig};
use pageturner::sentinel::ManualSentinel;
use pageturner::source::http::HttpSource;
use pageturner_core::{BadgeSummary, IssuerSummary, PathwaySummary, SortOrder};

/// Terminal browser for a pageturner catalog backend
#[derive(Parser, Debug)]
#[command(name = "pageturner")]
#[command(version, about, long_about = None)]
struct Args {
    /// Catalog to browse
    #[arg(value_enum, default_value = "badges")]
    catalog: CatalogKind,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalog API base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Substring to search entry names for
    #[arg(short, long, value_name = "TEXT")]
    search: Option<String>,

    /// Tag filter; repeat for several tags
    #[arg(short, long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Result ordering
    #[arg(long, value_enum, default_value = "name-asc")]
    sort: SortArg,

    /// Page size override
    #[arg(long, value_name = "N")]
    limit: Option<u32>,

    /// Stop after this many pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Debounce override in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CatalogKind {
    Badges,
    Issuers,
    Pathways,
}

impl CatalogKind {
    fn endpoint(self) -> &'static str {
        match self {
            CatalogKind::Badges => "badges",
            CatalogKind::Issuers => "issuers",
            CatalogKind::Pathways => "pathways",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    NameAsc,
    NameDesc,
    CreatedAsc,
    CreatedDesc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::NameAsc => SortOrder::NameAsc,
            SortArg::NameDesc => SortOrder::NameDesc,
            SortArg::CreatedAsc => SortOrder::CreatedAsc,
            SortArg::CreatedDesc => SortOrder::CreatedDesc,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_ref(), args.base_url.as_deref(), args.debounce_ms)?;

    let page_size = args.limit.unwrap_or(match args.catalog {
        CatalogKind::Badges => config.catalogs.badges_per_page,
        CatalogKind::Issuers => config.catalogs.issuers_per_page,
        CatalogKind::Pathways => config.catalogs.pathways_per_page,
    });
    let feed_config = FeedConfig {
        page_size,
        debounce: Duration::from_millis(config.debounce_ms),
    };

    info!(
        "Browsing {} at {} ({} per page)",
        args.catalog.endpoint(),
        config.base_url,
        page_size
    );

    let source = HttpSource::new(config.base_url, args.catalog.endpoint());
    match args.catalog {
        CatalogKind::Badges => browse::<BadgeSummary>(source, feed_config, &args, render_badge).await,
        CatalogKind::Issuers => browse::<IssuerSummary>(source, feed_config, &args, render_issuer).await,
        CatalogKind::Pathways => {
            browse::<PathwaySummary>(source, feed_config, &args, render_pathway).await
        }
    }
}

/// Drives a feed to completion, auto-scrolling: the terminal "viewport"
/// reaches the sentinel as soon as a page has been rendered.
async fn browse<T>(
    source: HttpSource,
    feed_config: FeedConfig,
    args: &Args,
    render: fn(&T),
) -> anyhow::Result<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let feed: CatalogFeed<T, _> = CatalogFeed::new(source, feed_config);
    let filters = feed.filters();
    let mut results = feed.results();
    let trigger = feed.scroll_trigger();
    let sentinel = ManualSentinel::new();
    trigger.attach(&sentinel);
    let worker = tokio::spawn(feed.run());

    if let Some(search) = &args.search {
        filters.set_search(search.clone());
    }
    if !args.tags.is_empty() {
        filters.set_tags(args.tags.clone());
    }
    filters.set_order(args.sort.into());
    filters.set_page(0);

    let mut shown = 0;
    let mut pages = 0;
    loop {
        if results.changed().await.is_err() {
            break;
        }
        let (total, has_next) = {
            let set = results.borrow_and_update();
            for item in &set.items[shown..] {
                render(item);
            }
            shown = set.items.len();
            (set.total, set.has_next)
        };
        pages += 1;
        println!("-- {} of {} --", shown, total);

        if !has_next {
            break;
        }
        if let Some(max) = args.max_pages {
            if pages >= max {
                break;
            }
        }
        sentinel.enter_viewport();
    }

    worker.abort();
    Ok(())
}

fn render_badge(badge: &BadgeSummary) {
    println!("- {} ({})", badge.name, badge.issuer_name);
    if !badge.tags.is_empty() {
        println!("  tags: {}", badge.tags.join(", "));
    }
    println!("  {}", badge.description);
}

fn render_issuer(issuer: &IssuerSummary) {
    let city = issuer.city.as_deref().unwrap_or("-");
    println!("- {} [{}], {} badges", issuer.name, city, issuer.badge_count);
    println!("  {}", issuer.description);
}

fn render_pathway(pathway: &PathwaySummary) {
    println!("- {} ({} badges)", pathway.name, pathway.badge_count);
    if !pathway.tags.is_empty() {
        println!("  tags: {}", pathway.tags.join(", "));
    }
    println!("  {}", pathway.description);
}

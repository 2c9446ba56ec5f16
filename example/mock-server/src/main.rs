//! Mock catalog backend for pageturner demos.
//!
//! Serves generated badge, issuer, and pathway catalogs with the same
//! offset/limit/name/tags/ordering contract the real platform exposes:
//!
//!   GET /api/v1/badges?offset=0&limit=21&name=math&tags=stem&ordering=-created_at
//!
//! Responses are `{ count, next, previous, results }` envelopes with real
//! next/previous links.
//!
//! Usage:
//!   cargo run -p mock-server [-- --port 8000 --count 57]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use jiff::Timestamp;
use matchit::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pageturner_core::{BadgeSummary, Envelope, IssuerSummary, PathwaySummary};

/// Mock catalog backend for pageturner demos
#[derive(Parser, Debug)]
#[command(name = "mock-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Bind address
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1")]
    bind: String,

    /// Port number
    #[arg(short, long, value_name = "PORT", default_value_t = 8000)]
    port: u16,

    /// Entries generated per catalog
    #[arg(long, value_name = "N", default_value_t = 57)]
    count: usize,
}

const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Welding",
    "Digital Literacy",
    "First Aid",
    "Carpentry",
    "Urban Gardening",
    "Public Speaking",
    "Data Analysis",
    "Cooking",
    "Robotics",
    "Photography",
    "Bookkeeping",
];
const LEVELS: &[&str] = &["Basics", "Practitioner", "Advanced"];
const TAGS: &[&str] = &["stem", "craft", "digital", "health", "civic", "language"];
const CITIES: &[&str] = &["Espoo", "Oulu", "Tampere", "Turku", "Helsinki"];

/// One entry per day, counting back from a fixed date so ordering by
/// `created_at` is deterministic.
fn created(i: usize) -> Timestamp {
    Timestamp::from_second(1_700_000_000 - (i as i64) * 86_400).unwrap()
}

fn badges(count: usize) -> Vec<BadgeSummary> {
    (0..count)
        .map(|i| {
            let subject = SUBJECTS[i % SUBJECTS.len()];
            let level = LEVELS[(i / SUBJECTS.len()) % LEVELS.len()];
            BadgeSummary {
                id: format!("badge-{i:03}"),
                name: format!("{subject} {level}"),
                description: format!(
                    "Demonstrates {} competence at {} level.",
                    subject.to_lowercase(),
                    level.to_lowercase()
                ),
                image: Some(format!("https://img.example.org/badges/{i:03}.png")),
                issuer_name: format!("{} Adult Education Centre", CITIES[i % CITIES.len()]),
                tags: vec![
                    TAGS[i % TAGS.len()].to_string(),
                    TAGS[(i + 2) % TAGS.len()].to_string(),
                ],
                created_at: created(i),
            }
        })
        .collect()
}

fn issuers(count: usize) -> Vec<IssuerSummary> {
    (0..count)
        .map(|i| {
            let city = CITIES[i % CITIES.len()];
            IssuerSummary {
                id: format!("issuer-{i:03}"),
                name: format!("{city} Community College {}", i / CITIES.len() + 1),
                description: format!("Adult education provider in {city}."),
                image: Some(format!("https://img.example.org/issuers/{i:03}.png")),
                city: Some(city.to_string()),
                badge_count: ((i * 7) % 40) as u32,
                created_at: created(i),
            }
        })
        .collect()
}

fn pathways(count: usize) -> Vec<PathwaySummary> {
    (0..count)
        .map(|i| {
            let subject = SUBJECTS[i % SUBJECTS.len()];
            PathwaySummary {
                id: format!("pathway-{i:03}"),
                name: format!("{subject} Pathway"),
                description: format!("Guided badge series towards {} skills.", subject.to_lowercase()),
                tags: vec![TAGS[i % TAGS.len()].to_string()],
                badge_count: (3 + i % 5) as u32,
                created_at: created(i),
            }
        })
        .collect()
}

/// The pieces of an entry the list endpoint filters and sorts on.
trait CatalogEntry: Serialize + Clone {
    fn name(&self) -> &str;
    fn tags(&self) -> &[String];
    fn created_at(&self) -> Timestamp;
}

impl CatalogEntry for BadgeSummary {
    fn name(&self) -> &str {
        &self.name
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl CatalogEntry for IssuerSummary {
    fn name(&self) -> &str {
        &self.name
    }
    fn tags(&self) -> &[String] {
        &[]
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl CatalogEntry for PathwaySummary {
    fn name(&self) -> &str {
        &self.name
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Filters, sorts, and slices one catalog according to the query string.
fn list_page<T: CatalogEntry>(
    entries: &[T],
    path: &str,
    params: &HashMap<String, String>,
) -> Envelope<T> {
    let mut matched: Vec<&T> = entries
        .iter()
        .filter(|entry| {
            if let Some(name) = params.get("name") {
                if !entry.name().to_lowercase().contains(&name.to_lowercase()) {
                    return false;
                }
            }
            if let Some(tags) = params.get("tags") {
                let wanted: Vec<&str> = tags.split(',').filter(|t| !t.is_empty()).collect();
                if !wanted.is_empty()
                    && !entry.tags().iter().any(|t| wanted.contains(&t.as_str()))
                {
                    return false;
                }
            }
            true
        })
        .collect();

    match params.get("ordering").map(String::as_str) {
        Some("-name") => matched.sort_by(|a, b| b.name().cmp(a.name())),
        Some("created_at") => matched.sort_by_key(|e| e.created_at()),
        Some("-created_at") => {
            matched.sort_by_key(|e| e.created_at());
            matched.reverse();
        }
        _ => matched.sort_by(|a, b| a.name().cmp(b.name())),
    }

    let count = matched.len();
    let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20)
        .max(1);

    let results: Vec<T> = matched.into_iter().skip(offset).take(limit).cloned().collect();
    let end = offset + results.len();

    Envelope {
        count: count as u32,
        next: (end < count).then(|| format!("{path}?offset={end}&limit={limit}")),
        previous: (offset > 0).then(|| {
            format!("{path}?offset={}&limit={limit}", offset.saturating_sub(limit))
        }),
        results,
    }
}

struct Dataset {
    badges: Vec<BadgeSummary>,
    issuers: Vec<IssuerSummary>,
    pathways: Vec<PathwaySummary>,
}

#[derive(Clone, Copy)]
enum Route {
    Health,
    Badges,
    Issuers,
    Pathways,
}

fn build_router() -> Router<Route> {
    let mut router = Router::new();
    router.insert("/health", Route::Health).unwrap();
    router.insert("/api/v1/badges", Route::Badges).unwrap();
    router.insert("/api/v1/issuers", Route::Issuers).unwrap();
    router.insert("/api/v1/pathways", Route::Pathways).unwrap();
    router
}

fn json_response<T: Serialize>(value: &T) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(
            serde_json::to_string(value).unwrap(),
        )))
        .unwrap()
}

async fn handle_request(
    req: Request<Incoming>,
    dataset: Arc<Dataset>,
    router: Arc<Router<Route>>,
) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let params = parse_query(req.uri().query());

    debug!("{} {}", method, path);

    let matched = match router.at(&path) {
        Ok(m) => m,
        Err(_) => {
            return Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(r#"{"error":"Not found"}"#)))
                .unwrap());
        }
    };

    let response = match (method, *matched.value) {
        (Method::GET, Route::Health) => json_response(&serde_json::json!({"status": "ok"})),
        (Method::GET, Route::Badges) => {
            json_response(&list_page(&dataset.badges, &path, &params))
        }
        (Method::GET, Route::Issuers) => {
            json_response(&list_page(&dataset.issuers, &path, &params))
        }
        (Method::GET, Route::Pathways) => {
            json_response(&list_page(&dataset.pathways, &path, &params))
        }
        _ => Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(r#"{"error":"Method not allowed"}"#)))
            .unwrap(),
    };

    Ok(response)
}

/// Parse query string into key-value pairs
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(q) = query {
        for part in q.split('&') {
            if let Some((key, value)) = part.split_once('=') {
                map.insert(urldecode(key), urldecode(value));
            }
        }
    }
    map
}

fn urldecode(s: &str) -> String {
    // Decode into bytes first: percent-escapes may span a multi-byte
    // UTF-8 sequence.
    let mut bytes = Vec::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    bytes.push(byte);
                }
            }
            '+' => bytes.push(b' '),
            _ => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let dataset = Arc::new(Dataset {
        badges: badges(args.count),
        issuers: issuers(args.count),
        pathways: pathways(args.count),
    });
    let router = Arc::new(build_router());

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Mock catalog listening on http://{}", addr);

    loop {
        let (stream, remote_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let dataset = Arc::clone(&dataset);
        let router = Arc::clone(&router);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let dataset = Arc::clone(&dataset);
                let router = Arc::clone(&router);
                handle_request(req, dataset, router)
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Error serving connection from {}: {}", remote_addr, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn slices_and_links_pages() {
        let data = badges(45);
        let envelope = list_page(&data, "/api/v1/badges", &params(&[("limit", "20")]));
        assert_eq!(envelope.count, 45);
        assert_eq!(envelope.results.len(), 20);
        assert!(envelope.previous.is_none());
        assert_eq!(
            envelope.next.as_deref(),
            Some("/api/v1/badges?offset=20&limit=20")
        );

        let last = list_page(
            &data,
            "/api/v1/badges",
            &params(&[("limit", "20"), ("offset", "40")]),
        );
        assert_eq!(last.results.len(), 5);
        assert!(last.next.is_none());
        assert!(last.previous.is_some());
    }

    #[test]
    fn filters_by_name_substring() {
        let data = badges(45);
        let envelope = list_page(&data, "/api/v1/badges", &params(&[("name", "math")]));
        assert!(envelope.count > 0);
        assert!(envelope
            .results
            .iter()
            .all(|b| b.name.to_lowercase().contains("math")));
    }

    #[test]
    fn filters_by_any_tag() {
        let data = badges(45);
        let envelope = list_page(
            &data,
            "/api/v1/badges",
            &params(&[("tags", "stem,craft")]),
        );
        assert!(envelope.count > 0);
        assert!(envelope
            .results
            .iter()
            .all(|b| b.tags.iter().any(|t| t == "stem" || t == "craft")));
    }

    #[test]
    fn urldecode_handles_multibyte_escapes() {
        assert_eq!(urldecode("J%C3%A4rvenp%C3%A4%C3%A4"), "Järvenpää");
        assert_eq!(urldecode("first+aid"), "first aid");
        assert_eq!(
            parse_query(Some("name=k%C3%A4sity%C3%B6&limit=20"))
                .get("name")
                .map(String::as_str),
            Some("käsityö")
        );
    }

    #[test]
    fn descending_ordering_is_prefixed() {
        let data = badges(10);
        let envelope = list_page(
            &data,
            "/api/v1/badges",
            &params(&[("ordering", "-created_at")]),
        );
        let stamps: Vec<_> = envelope.results.iter().map(|b| b.created_at).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        sorted.reverse();
        assert_eq!(stamps, sorted);
    }
}

use async_trait::async_trait;
use pageturner_core::{Envelope, QuerySpec};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::CatalogSource;

/// Catalog source backed by an offset-paginated REST endpoint.
///
/// Issues `GET {base_url}/{endpoint}` with `offset`, `limit`, optional
/// `name` and `tags`, and an `ordering` parameter (descending fields
/// prefixed with `-`).
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    endpoint: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, endpoint)
    }

    /// Uses a caller-provided client, e.g. one with timeouts configured.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint: endpoint.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.endpoint)
    }
}

#[async_trait]
impl<T> CatalogSource<T> for HttpSource
where
    T: DeserializeOwned + Send,
{
    async fn fetch_page(&self, query: &QuerySpec) -> Result<Envelope<T>> {
        let url = self.url();
        debug!(%url, offset = query.offset, limit = query.limit, "fetching catalog page");

        let response = self
            .client
            .get(&url)
            .query(&query.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

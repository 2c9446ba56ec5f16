use std::sync::Arc;

use async_trait::async_trait;
use pageturner_core::{Envelope, QuerySpec};

use crate::error::Result;

pub mod http;

/// A catalog backend that can serve one page per request.
///
/// This is the pipeline's only external collaborator; everything else in
/// the crate is synchronous state handling around it.
#[async_trait]
pub trait CatalogSource<T>: Send + Sync {
    /// Fetches the page described by `query`.
    async fn fetch_page(&self, query: &QuerySpec) -> Result<Envelope<T>>;
}

#[async_trait]
impl<T, S> CatalogSource<T> for Arc<S>
where
    S: CatalogSource<T> + ?Sized,
{
    async fn fetch_page(&self, query: &QuerySpec) -> Result<Envelope<T>> {
        (**self).fetch_page(query).await
    }
}

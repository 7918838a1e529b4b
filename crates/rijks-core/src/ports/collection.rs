use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::CollectionPage;
use crate::errors::DataLoadError;

/// Port for the collection endpoint.
///
/// One call is one HTTP GET for `(keyword, page)`. Implementations never
/// panic or throw past this boundary: every failure comes back as a
/// [`DataLoadError`]. Retry policy, TLS and pooling belong to the adapter.
#[async_trait]
pub trait CollectionSource: Send + Sync {
  async fn fetch_page(&self, keyword: &str, page: u32) -> Result<CollectionPage, DataLoadError>;
}

#[async_trait]
impl<T> CollectionSource for Arc<T>
where
  T: CollectionSource + ?Sized,
{
  async fn fetch_page(&self, keyword: &str, page: u32) -> Result<CollectionPage, DataLoadError> {
    (**self).fetch_page(keyword, page).await
  }
}

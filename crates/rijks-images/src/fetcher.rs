use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageFetchError {
  #[error("invalid image url: {0}")]
  BadUrl(String),
  #[error("image request failed: {0}")]
  Transport(String),
  #[error("image server returned status {0}")]
  Status(u16),
}

/// Port for raw image downloads. Decoding is the cache's job.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImageFetchError>;
}

#[async_trait]
impl<T> ImageFetcher for Arc<T>
where
  T: ImageFetcher + ?Sized,
{
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
    (**self).fetch_bytes(url).await
  }
}

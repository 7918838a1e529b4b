use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ImageConfig;
use crate::fetcher::{ImageFetchError, ImageFetcher};

/// Downloads image bytes with `reqwest`. Any non-2xx status is an error.
#[derive(Clone)]
pub struct HttpImageFetcher {
  client: Client,
}

impl HttpImageFetcher {
  pub fn new(config: &ImageConfig) -> Result<Self, ImageFetchError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(config.user_agent.clone())
      .build()
      .map_err(|e| ImageFetchError::Transport(e.to_string()))?;
    Ok(Self { client })
  }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
    debug!(url, "downloading image");

    let response = self.client.get(url).send().await.map_err(|e| {
      if e.is_builder() {
        ImageFetchError::BadUrl(url.to_owned())
      } else {
        ImageFetchError::Transport(e.to_string())
      }
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(ImageFetchError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await.map_err(|e| ImageFetchError::Transport(e.to_string()))?;
    Ok(bytes.to_vec())
  }
}

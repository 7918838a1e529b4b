use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::{debug, warn};

use rijks_core::DataLoadError;
use rijks_core::domain::CollectionPage;
use rijks_core::ports::CollectionSource;

use crate::config::ApiConfig;
use crate::route::ApiRoute;

/// `CollectionSource` adapter over `reqwest`.
///
/// Superseding a request is the controller's job (it aborts the task that
/// awaits this handler), so the handler itself keeps no request state.
#[derive(Clone)]
pub struct RequestHandler {
  client: Client,
  config: ApiConfig,
}

impl RequestHandler {
  pub fn new(config: ApiConfig) -> Result<Self, DataLoadError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| DataLoadError::GenericError(e.to_string()))?;
    Ok(Self { client, config })
  }

  /// GETs `route` and decodes the body into `T`.
  pub async fn request<T: DeserializeOwned>(&self, route: &ApiRoute) -> Result<T, DataLoadError> {
    let url = route.url(&self.config)?;
    debug!(%url, "GET");

    let response = self.client.get(url).send().await.map_err(transport_error)?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(transport_error)?;

    classify_response(status, &body)
  }
}

#[async_trait]
impl CollectionSource for RequestHandler {
  async fn fetch_page(&self, keyword: &str, page: u32) -> Result<CollectionPage, DataLoadError> {
    self.request(&ApiRoute::collections_list(keyword, page)).await
  }
}

/// Turns a finished response into a payload or the matching error.
///
/// Order matters: an empty body wins over a bad status, and only a 200 is
/// decoded at all.
pub fn classify_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, DataLoadError> {
  if body.is_empty() {
    return Err(DataLoadError::NoData);
  }

  if status != 200 {
    return Err(DataLoadError::InvalidResponseCode(status));
  }

  serde_json::from_slice(body).map_err(|e| match e.classify() {
    Category::Data => DataLoadError::DecodingError(e.to_string()),
    Category::Syntax | Category::Eof | Category::Io => {
      warn!(error = %e, "failed to decode incoming JSON");
      DataLoadError::MalformedContent
    }
  })
}

fn transport_error(err: reqwest::Error) -> DataLoadError {
  if err.is_builder() {
    return DataLoadError::BadUrl;
  }
  DataLoadError::GenericError(err.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r#"{"count": 1, "artObjects": [{"id": "1", "title": "t", "longTitle": "lt", "productionPlaces": []}]}"#;

  #[test]
  fn ok_body_decodes() {
    let page: CollectionPage = classify_response(200, PAGE.as_bytes()).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].id, "1");
  }

  #[test]
  fn empty_body_is_no_data_even_with_bad_status() {
    assert_eq!(classify_response::<CollectionPage>(200, b""), Err(DataLoadError::NoData));
    assert_eq!(classify_response::<CollectionPage>(500, b""), Err(DataLoadError::NoData));
  }

  #[test]
  fn non_200_is_invalid_response_code() {
    assert_eq!(
      classify_response::<CollectionPage>(400, PAGE.as_bytes()),
      Err(DataLoadError::InvalidResponseCode(400))
    );
    assert_eq!(
      classify_response::<CollectionPage>(204, PAGE.as_bytes()),
      Err(DataLoadError::InvalidResponseCode(204))
    );
  }

  #[test]
  fn garbage_is_malformed_content() {
    assert_eq!(
      classify_response::<CollectionPage>(200, b"<html>nope</html>"),
      Err(DataLoadError::MalformedContent)
    );
    assert_eq!(
      classify_response::<CollectionPage>(200, b"{\"count\": 1"),
      Err(DataLoadError::MalformedContent)
    );
  }

  #[test]
  fn wrong_shape_is_a_decoding_error() {
    let err = classify_response::<CollectionPage>(200, br#"{"count": "many", "artObjects": []}"#)
      .unwrap_err();
    match err {
      DataLoadError::DecodingError(message) => assert!(message.contains("invalid type")),
      other => panic!("expected DecodingError, got {other:?}"),
    }

    let err = classify_response::<CollectionPage>(200, br#"{"count": 3}"#).unwrap_err();
    assert!(matches!(err, DataLoadError::DecodingError(m) if m.contains("artObjects")));
  }
}

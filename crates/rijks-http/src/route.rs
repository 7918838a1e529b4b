use rijks_core::DataLoadError;
use url::Url;

use crate::config::ApiConfig;

/// Every endpoint the app talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRoute {
  CollectionsList { keyword: String, page: u32 },
}

impl ApiRoute {
  pub fn collections_list(keyword: impl Into<String>, page: u32) -> Self {
    ApiRoute::CollectionsList { keyword: keyword.into(), page }
  }

  fn path(&self, config: &ApiConfig) -> String {
    match self {
      ApiRoute::CollectionsList { .. } => format!("{}/collection", config.culture),
    }
  }

  fn parameters(&self, config: &ApiConfig) -> Vec<(&'static str, String)> {
    match self {
      ApiRoute::CollectionsList { keyword, page } => vec![
        ("key", config.api_key.clone()),
        ("q", keyword.clone()),
        ("p", page.to_string()),
      ],
    }
  }

  /// Full request URL. Query values are percent-encoded (space → `%20`).
  pub fn url(&self, config: &ApiConfig) -> Result<Url, DataLoadError> {
    let mut base = config.base_url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }

    let base = Url::parse(&base).map_err(|_| DataLoadError::BadUrl)?;
    let mut url = base.join(&self.path(config)).map_err(|_| DataLoadError::BadUrl)?;

    let query = self
      .parameters(config)
      .into_iter()
      .map(|(name, value)| format!("{name}={}", urlencoding::encode(&value)))
      .collect::<Vec<_>>()
      .join("&");
    if !query.is_empty() {
      url.set_query(Some(&query));
    }

    Ok(url)
  }
}

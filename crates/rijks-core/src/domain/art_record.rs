use serde::{Deserialize, Deserializer};

/// One art object exactly as the collection endpoint describes it.
///
/// Immutable once decoded; the controller only keeps it long enough to
/// project it into an [`ArtViewModel`](super::view_model::ArtViewModel).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtRecord {
  pub id: String,
  pub title: String,
  pub long_title: String,
  #[serde(default)]
  pub production_places: Vec<String>,
  #[serde(rename = "principalOrFirstMaker", default)]
  pub principal_maker: Option<String>,
  #[serde(rename = "webImage", default, deserialize_with = "nested_image_url")]
  pub web_image_url: Option<String>,
  #[serde(rename = "headerImage", default, deserialize_with = "nested_image_url")]
  pub header_image_url: Option<String>,
}

/// One page of search results plus the server-side total for the keyword.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionPage {
  #[serde(rename = "artObjects")]
  pub items: Vec<ArtRecord>,
  #[serde(rename = "count")]
  pub total_count: u64,
}

impl CollectionPage {
  pub fn new(items: Vec<ArtRecord>, total_count: u64) -> Self {
    Self { items, total_count }
  }
}

// `webImage` / `headerImage` are objects (`{"url": ...}`) that may themselves
// be missing or null.
fn nested_image_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  struct WireImage {
    url: Option<String>,
  }

  Ok(Option::<WireImage>::deserialize(deserializer)?.and_then(|image| image.url))
}

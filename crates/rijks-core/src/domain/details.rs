use serde::Serialize;

use super::view_model::ArtViewModel;

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_PLACE: &str = "Unknown Place";

/// Labels for the details screen of a single art object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtDetails {
  pub image_url: Option<String>,
  pub short_title: String,
  pub long_title: String,
  pub artist: String,
  pub production_places: String,
}

impl From<&ArtViewModel> for ArtDetails {
  fn from(vm: &ArtViewModel) -> Self {
    let places = if vm.production_places_list.is_empty() {
      UNKNOWN_PLACE
    } else {
      vm.production_places_list.as_str()
    };
    let artist = vm.maker_name.as_deref().unwrap_or(UNKNOWN_ARTIST);

    Self {
      image_url: vm.web_image_url.clone(),
      short_title: vm.title.clone(),
      long_title: vm.long_title.clone(),
      artist: format!("Artist: {artist}"),
      production_places: format!("Production Places: {places}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn view_model(places: &str, maker: Option<&str>) -> ArtViewModel {
    ArtViewModel {
      id: "100".into(),
      title: "Amazing art".into(),
      long_title: "Amazing art which was produced in this century".into(),
      production_places_list: places.into(),
      web_image_url: Some("https://example.org/web.jpg".into()),
      header_image_url: Some("https://example.org/header.jpg".into()),
      maker_name: maker.map(Into::into),
      short_description: "irrelevant".into(),
    }
  }

  #[test]
  fn populates_labels() {
    let details = ArtDetails::from(&view_model("Amsterdam, Paris, Sydney", Some("Picasso")));

    assert_eq!(details.image_url.as_deref(), Some("https://example.org/web.jpg"));
    assert_eq!(details.short_title, "Amazing art");
    assert_eq!(details.long_title, "Amazing art which was produced in this century");
    assert_eq!(details.artist, "Artist: Picasso");
    assert_eq!(details.production_places, "Production Places: Amsterdam, Paris, Sydney");
  }

  #[test]
  fn missing_values_use_placeholders() {
    let details = ArtDetails::from(&view_model("", None));

    assert_eq!(details.artist, "Artist: Unknown Artist");
    assert_eq!(details.production_places, "Production Places: Unknown Place");
  }
}

use std::hash::{Hash, Hasher};

use super::art_record::ArtRecord;

/// Display-ready projection of an [`ArtRecord`].
///
/// Identity is the `id` and nothing else: two view-models with the same id
/// are the same entity even if every other field differs. List diffing and
/// the tests rely on this.
#[derive(Debug, Clone)]
pub struct ArtViewModel {
  pub id: String,
  pub title: String,
  pub long_title: String,
  /// Production places joined with `", "`.
  pub production_places_list: String,
  pub web_image_url: Option<String>,
  pub header_image_url: Option<String>,
  pub maker_name: Option<String>,
  /// `"{title} By {maker}"`, or just the title when the maker is unknown.
  pub short_description: String,
}

impl ArtViewModel {
  pub fn project(record: &ArtRecord) -> Self {
    let short_description = match &record.principal_maker {
      Some(maker) => format!("{} By {}", record.title, maker),
      None => record.title.clone(),
    };

    Self {
      id: record.id.clone(),
      title: record.title.clone(),
      long_title: record.long_title.clone(),
      production_places_list: record.production_places.join(", "),
      web_image_url: record.web_image_url.clone(),
      header_image_url: record.header_image_url.clone(),
      maker_name: record.principal_maker.clone(),
      short_description,
    }
  }
}

impl From<&ArtRecord> for ArtViewModel {
  fn from(record: &ArtRecord) -> Self {
    ArtViewModel::project(record)
  }
}

impl PartialEq for ArtViewModel {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for ArtViewModel {}

impl Hash for ArtViewModel {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

/// Projects a whole page, keeping the server order.
pub fn project_page(records: &[ArtRecord]) -> Vec<ArtViewModel> {
  records.iter().map(ArtViewModel::project).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn record(id: &str, title: &str, maker: Option<&str>) -> ArtRecord {
    ArtRecord {
      id: id.into(),
      title: title.into(),
      long_title: format!("{title}, long"),
      production_places: vec!["Parijs".into(), "Amsterdam".into()],
      principal_maker: maker.map(Into::into),
      web_image_url: Some("https://example.org/web.jpg".into()),
      header_image_url: None,
    }
  }

  fn view_model(id: &str, title: &str, places: &str) -> ArtViewModel {
    ArtViewModel {
      id: id.into(),
      title: title.into(),
      long_title: "long title".into(),
      production_places_list: places.into(),
      web_image_url: None,
      header_image_url: None,
      maker_name: None,
      short_description: "Object of value".into(),
    }
  }

  #[test]
  fn short_description_includes_the_maker() {
    let vm = ArtViewModel::project(&record("1", "Paar oorclips van verguld koper", Some("Monet")));
    assert_eq!(vm.short_description, "Paar oorclips van verguld koper By Monet");
    assert_eq!(vm.maker_name.as_deref(), Some("Monet"));
  }

  #[test]
  fn short_description_falls_back_to_title() {
    let vm = ArtViewModel::project(&record("1", "Paar oorclips van verguld koper", None));
    assert_eq!(vm.short_description, "Paar oorclips van verguld koper");
    assert_eq!(vm.maker_name, None);
  }

  #[test]
  fn production_places_are_comma_joined() {
    let vm = ArtViewModel::project(&record("1", "t", None));
    assert_eq!(vm.production_places_list, "Parijs, Amsterdam");
    assert_eq!(vm.web_image_url.as_deref(), Some("https://example.org/web.jpg"));
  }

  #[test]
  fn equality_and_hash_only_look_at_id() {
    let one = view_model("100", "This title", "Amsterdam");
    let same_id = view_model("100", "This title is short", "Boston");
    let other_id = view_model("200", "This title", "Amsterdam");

    assert_eq!(one, same_id);
    assert_ne!(one, other_id);

    let set: HashSet<_> = [one, same_id, other_id].into_iter().collect();
    assert_eq!(set.len(), 2);
  }

  #[test]
  fn page_projection_keeps_order() {
    let records = vec![record("b", "B", None), record("a", "A", None), record("c", "C", None)];
    let ids: Vec<_> = project_page(&records).into_iter().map(|vm| vm.id).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
  }
}

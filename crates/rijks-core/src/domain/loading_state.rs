use super::view_model::ArtViewModel;

/// Outcome channel of the search controller. Exactly one holds at a time.
///
/// `Idle` means nothing has been searched yet; `EmptyResult` means a search
/// completed and the server had nothing for the keyword. They are not
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadingState {
  #[default]
  Idle,
  Loading,
  /// The full accumulated list for the current session.
  Success(Vec<ArtViewModel>),
  Failure(String),
  EmptyResult,
}

impl LoadingState {
  pub fn is_loading(&self) -> bool {
    matches!(self, LoadingState::Loading)
  }

  pub fn items(&self) -> Option<&[ArtViewModel]> {
    match self {
      LoadingState::Success(items) => Some(items),
      _ => None,
    }
  }
}

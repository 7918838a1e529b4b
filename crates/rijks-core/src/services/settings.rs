use serde::{Deserialize, Serialize};

/// Tunables for the search controller, read from the `[search]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
  /// How many items before the end of the list the next page is requested.
  #[serde(default = "default_prefetch_offset")]
  pub prefetch_offset: usize,

  /// Buffer of the event broadcast; slow observers past it miss events.
  #[serde(default = "default_event_capacity")]
  pub event_capacity: usize,
}

fn default_prefetch_offset() -> usize {
  5
}

fn default_event_capacity() -> usize {
  64
}

impl Default for SearchSettings {
  fn default() -> Self {
    Self { prefetch_offset: default_prefetch_offset(), event_capacity: default_event_capacity() }
  }
}

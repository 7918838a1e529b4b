use tracing::warn;

use super::art_record::CollectionPage;
use super::view_model::{ArtViewModel, project_page};

/// What a page response did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
  /// Page 1 reported zero results for the keyword.
  Empty,
  /// The page was taken in; the accumulated list is ready to be shown.
  Items,
  /// The page was already loaded or does not follow the last loaded one;
  /// nothing changed.
  Skipped,
}

/// Pagination bookkeeping for one logical search.
///
/// Invariants:
/// - `accumulated.len() <= total_available` once the total is known.
/// - `current_page` never decreases until the next `start`.
#[derive(Debug, Clone)]
pub struct SearchSession {
  keyword: Option<String>,
  current_page: u32,
  total_available: u64,
  accumulated: Vec<ArtViewModel>,
  has_more_pages: bool,
  /// Highest page whose items are already in `accumulated`.
  loaded_pages: u32,
}

impl Default for SearchSession {
  fn default() -> Self {
    Self {
      keyword: None,
      current_page: 1,
      total_available: 0,
      accumulated: Vec::new(),
      has_more_pages: true,
      loaded_pages: 0,
    }
  }
}

impl SearchSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts a new session for `keyword`, dropping everything from the last one.
  pub fn start(&mut self, keyword: &str) {
    self.reset();
    self.keyword = Some(keyword.to_owned());
  }

  /// Clears counters and results but keeps the keyword.
  pub fn reset(&mut self) {
    let keyword = self.keyword.take();
    *self = Self { keyword, ..Self::default() };
  }

  /// Moves to the page right after the last one absorbed.
  ///
  /// Until page 1 has been absorbed (first request failed, or after a reset)
  /// this stays on page 1.
  pub fn advance_page(&mut self) -> u32 {
    self.current_page = self.loaded_pages + 1;
    self.current_page
  }

  /// Folds the response for `page` into the session.
  ///
  /// Page 1 sets the total and replaces the list; the page right after the
  /// last loaded one is appended; re-deliveries of an already loaded page
  /// leave the list alone.
  pub fn absorb(&mut self, page: u32, response: CollectionPage) -> PageOutcome {
    if page <= 1 {
      self.total_available = response.total_count;
      self.accumulated.clear();
      self.loaded_pages = 0;

      if response.total_count == 0 {
        self.has_more_pages = false;
        return PageOutcome::Empty;
      }
    }

    if page != self.loaded_pages + 1 {
      if page > self.loaded_pages {
        warn!(page, loaded = self.loaded_pages, "page does not follow the last loaded one, skipping");
      }
      return PageOutcome::Skipped;
    }
    self.loaded_pages = page;

    if response.items.is_empty() {
      self.has_more_pages = false;
      return PageOutcome::Items;
    }

    let remaining = self.remaining();
    let mut projected = project_page(&response.items);
    if projected.len() > remaining {
      warn!(
        page,
        received = projected.len(),
        remaining,
        "page holds more items than the reported total, truncating"
      );
      projected.truncate(remaining);
    }

    self.accumulated.extend(projected);
    self.has_more_pages = (self.accumulated.len() as u64) < self.total_available;
    PageOutcome::Items
  }

  /// True exactly when `visible_index` sits `offset` items before the end.
  pub fn should_prefetch(&self, visible_index: usize, offset: usize) -> bool {
    self.accumulated.len().checked_sub(offset) == Some(visible_index)
  }

  fn remaining(&self) -> usize {
    let remaining = self.total_available.saturating_sub(self.accumulated.len() as u64);
    usize::try_from(remaining).unwrap_or(usize::MAX)
  }

  pub fn keyword(&self) -> Option<&str> {
    self.keyword.as_deref()
  }

  pub fn current_page(&self) -> u32 {
    self.current_page
  }

  pub fn total_available(&self) -> u64 {
    self.total_available
  }

  pub fn accumulated(&self) -> &[ArtViewModel] {
    &self.accumulated
  }

  pub fn has_more_pages(&self) -> bool {
    self.has_more_pages
  }
}

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{ArtViewModel, CollectionPage, LoadingState, PageOutcome, SearchSession};
use crate::errors::DataLoadError;
use crate::ports::{CollectionSource, ImageInvalidator};
use crate::services::settings::SearchSettings;

/// Identifies one issued page request.
///
/// `session` changes on every new search (and on reset), `request` on every
/// issued fetch. A response is applied only if its tag is the outstanding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag {
  pub session: u64,
  pub request: u64,
  pub page: u32,
}

/// A finished page fetch on its way back to the controller.
#[derive(Debug)]
pub struct PageResponse {
  pub tag: RequestTag,
  pub result: Result<CollectionPage, DataLoadError>,
}

/// What observers of the controller receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  StateChanged(LoadingState),
  /// The user picked an item; routing to a details screen is up to the receiver.
  ItemSelected(ArtViewModel),
}

struct Outstanding {
  tag: RequestTag,
  task: JoinHandle<()>,
}

/// Search and pagination state machine.
///
/// All methods run on the task that owns the controller, which is also the
/// context where responses are applied (`next_response` / `apply`). Fetches
/// themselves run on spawned Tokio tasks, so the controller must be used
/// inside a Tokio runtime.
pub struct SearchController<S, I = ()>
where
  S: CollectionSource + 'static,
  I: ImageInvalidator,
{
  source: Arc<S>,
  images: I,
  settings: SearchSettings,
  session: SearchSession,
  state: LoadingState,
  /// Last non-`Loading` state; restored when the current request is cancelled.
  settled: LoadingState,
  session_token: u64,
  request_seq: u64,
  outstanding: Option<Outstanding>,
  responses_tx: mpsc::UnboundedSender<PageResponse>,
  responses_rx: mpsc::UnboundedReceiver<PageResponse>,
  events: broadcast::Sender<SearchEvent>,
}

impl<S, I> SearchController<S, I>
where
  S: CollectionSource + 'static,
  I: ImageInvalidator,
{
  pub fn new(source: S, images: I, settings: SearchSettings) -> Self {
    let (responses_tx, responses_rx) = mpsc::unbounded_channel();
    let (events, _) = broadcast::channel(settings.event_capacity.max(1));

    Self {
      source: Arc::new(source),
      images,
      settings,
      session: SearchSession::new(),
      state: LoadingState::Idle,
      settled: LoadingState::Idle,
      session_token: 0,
      request_seq: 0,
      outstanding: None,
      responses_tx,
      responses_rx,
      events,
    }
  }

  // -------- COMMANDS --------

  /// Starts a new session for `keyword`.
  ///
  /// No-op for an empty/absent keyword or while a request is loading.
  pub fn search(&mut self, keyword: Option<&str>) {
    let Some(keyword) = keyword.filter(|k| !k.is_empty()) else {
      return;
    };
    if self.state.is_loading() {
      debug!(keyword, "search ignored, a request is already loading");
      return;
    }

    self.abort_outstanding();
    self.session.start(keyword);
    self.settled = LoadingState::Idle;
    self.images.invalidate_all();
    self.session_token += 1;

    info!(keyword, session = self.session_token, "starting collection search");
    self.issue(keyword.to_owned(), 1);
  }

  /// Requests the page after the last loaded one (page 1 if none loaded yet).
  ///
  /// No-op without a keyword, when the last page was reached, or while loading.
  pub fn load_next_page(&mut self) {
    let Some(keyword) = self.session.keyword().map(str::to_owned) else {
      return;
    };
    if !self.session.has_more_pages() || self.state.is_loading() {
      return;
    }

    let page = self.session.advance_page();
    self.issue(keyword, page);
  }

  /// Re-issues the request for the current keyword and page, counters untouched.
  pub fn retry_last_request(&mut self) {
    let Some(keyword) = self.session.keyword().map(str::to_owned) else {
      return;
    };
    if self.state.is_loading() {
      return;
    }

    let page = self.session.current_page();
    info!(keyword = %keyword, page, "retrying collection request");
    self.issue(keyword, page);
  }

  /// Clears counters and results, keeping the keyword. Any outstanding
  /// request is dropped and the state falls back to `Idle`; the next
  /// `load_next_page` starts again from page 1.
  pub fn reset_search_state(&mut self) {
    self.abort_outstanding();
    self.session.reset();
    self.settled = LoadingState::Idle;
    self.session_token += 1;

    if self.state != LoadingState::Idle {
      self.transition(LoadingState::Idle);
    }
  }

  /// Emits `ItemSelected` for the item at `index`, if there is one.
  pub fn select_item(&self, index: usize) -> Option<ArtViewModel> {
    let item = self.session.accumulated().get(index)?.clone();
    let _ = self.events.send(SearchEvent::ItemSelected(item.clone()));
    Some(item)
  }

  // -------- RESPONSES --------

  /// Waits for the outstanding request and applies it.
  ///
  /// Returns `false` right away when nothing is outstanding. Stale
  /// responses still queued from superseded requests are skipped.
  pub async fn next_response(&mut self) -> bool {
    while self.outstanding.is_some() {
      let Some(response) = self.responses_rx.recv().await else {
        return false;
      };
      if self.apply(response) {
        return true;
      }
    }
    false
  }

  /// Applies `response` if it answers the outstanding request; returns
  /// whether it did.
  pub fn apply(&mut self, response: PageResponse) -> bool {
    let current = self.outstanding.as_ref().map(|o| o.tag);
    if current != Some(response.tag) {
      debug!(tag = ?response.tag, current = ?current, "discarding stale collection response");
      return false;
    }
    self.outstanding = None;

    match response.result {
      Ok(page) => match self.session.absorb(response.tag.page, page) {
        PageOutcome::Empty => self.transition(LoadingState::EmptyResult),
        PageOutcome::Items => {
          let items = self.session.accumulated().to_vec();
          self.transition(LoadingState::Success(items));
        }
        PageOutcome::Skipped => {
          debug!(tag = ?response.tag, "page already loaded, keeping previous state");
          let previous = self.settled.clone();
          self.transition(previous);
        }
      },
      Err(err) if err.is_cancellation() => {
        debug!(tag = ?response.tag, "request cancelled, restoring previous state");
        let previous = self.settled.clone();
        self.transition(previous);
      }
      Err(err) => {
        warn!(tag = ?response.tag, error = %err, "collection request failed");
        self.transition(LoadingState::Failure(err.message()));
      }
    }
    true
  }

  // -------- QUERY (read) --------

  /// True when the row at `visible_index` should trigger the next page.
  pub fn should_load_next_page(&self, visible_index: usize) -> bool {
    self.session.should_prefetch(visible_index, self.settings.prefetch_offset)
  }

  pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
    self.events.subscribe()
  }

  pub fn state(&self) -> &LoadingState {
    &self.state
  }

  pub fn accumulated(&self) -> &[ArtViewModel] {
    self.session.accumulated()
  }

  pub fn current_keyword(&self) -> Option<&str> {
    self.session.keyword()
  }

  pub fn current_page(&self) -> u32 {
    self.session.current_page()
  }

  pub fn total_available_count(&self) -> u64 {
    self.session.total_available()
  }

  pub fn has_more_pages(&self) -> bool {
    self.session.has_more_pages()
  }

  pub fn is_waiting(&self) -> bool {
    self.outstanding.is_some()
  }

  // -------- internals --------

  fn issue(&mut self, keyword: String, page: u32) {
    self.request_seq += 1;
    let tag = RequestTag { session: self.session_token, request: self.request_seq, page };

    self.transition(LoadingState::Loading);

    let source = Arc::clone(&self.source);
    let responses = self.responses_tx.clone();
    debug!(keyword = %keyword, page, request = tag.request, "requesting collection page");

    let task = tokio::spawn(async move {
      let result = AssertUnwindSafe(source.fetch_page(&keyword, page))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(DataLoadError::GenericError("collection request panicked".into())));
      // The receiver lives as long as the controller.
      let _ = responses.send(PageResponse { tag, result });
    });

    self.outstanding = Some(Outstanding { tag, task });
  }

  fn abort_outstanding(&mut self) {
    if let Some(outstanding) = self.outstanding.take() {
      debug!(tag = ?outstanding.tag, "aborting superseded collection request");
      outstanding.task.abort();
    }
  }

  fn transition(&mut self, next: LoadingState) {
    if !next.is_loading() {
      self.settled = next.clone();
    }
    self.state = next.clone();
    // No subscribers is fine.
    let _ = self.events.send(SearchEvent::StateChanged(next));
  }
}

impl<S, I> Drop for SearchController<S, I>
where
  S: CollectionSource + 'static,
  I: ImageInvalidator,
{
  fn drop(&mut self) {
    self.abort_outstanding();
  }
}

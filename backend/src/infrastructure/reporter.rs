use rijks_core::domain::LoadingState;
use rijks_core::services::SearchEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Logs every controller event on its own task.
///
/// The task ends once the controller (and with it the sender) is dropped.
pub struct EventReporter {
  task: JoinHandle<usize>,
}

impl EventReporter {
  pub fn spawn(mut events: broadcast::Receiver<SearchEvent>) -> Self {
    let task = tokio::spawn(async move {
      let mut seen = 0;
      loop {
        match events.recv().await {
          Ok(event) => {
            seen += 1;
            report(&event);
          }
          Err(RecvError::Lagged(skipped)) => warn!(skipped, "event reporter fell behind"),
          Err(RecvError::Closed) => return seen,
        }
      }
    });
    Self { task }
  }

  /// Waits for the sender side to go away; returns how many events were seen.
  pub async fn finish(self) -> usize {
    self.task.await.unwrap_or(0)
  }
}

fn report(event: &SearchEvent) {
  match event {
    SearchEvent::StateChanged(LoadingState::Idle) => debug!("search idle"),
    SearchEvent::StateChanged(LoadingState::Loading) => debug!("loading page"),
    SearchEvent::StateChanged(LoadingState::Success(items)) => info!(items = items.len(), "results updated"),
    SearchEvent::StateChanged(LoadingState::EmptyResult) => info!("search returned no results"),
    SearchEvent::StateChanged(LoadingState::Failure(message)) => warn!(%message, "search failed"),
    SearchEvent::ItemSelected(item) => info!(id = %item.id, title = %item.title, "item selected"),
  }
}

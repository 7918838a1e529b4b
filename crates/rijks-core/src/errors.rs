// crates/rijks-core/src/errors.rs
use thiserror::Error;

/// Every way a collection request can fail.
///
/// The `Display` output is the user-facing message; the search controller
/// forwards it untouched inside `LoadingState::Failure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataLoadError {
  #[error("Invalid URL encountered. Please enter the valid URL and try again")]
  BadUrl,

  /// Transport-level failure, carrying the underlying description.
  #[error("{0}")]
  GenericError(String),

  /// The request was superseded on purpose. Never shown to the user.
  #[error("Request was cancelled")]
  Cancelled,

  #[error("No data received from the server. Please try again later")]
  NoData,

  #[error("Received malformed content. Error may have been logged on the server to investigate further")]
  MalformedContent,

  #[error(
    "Server returned invalid response code. Expected between the range 200-299. Server returned {0}"
  )]
  InvalidResponseCode(u16),

  #[error("{0}")]
  DecodingError(String),
}

impl DataLoadError {
  pub fn message(&self) -> String {
    self.to_string()
  }

  pub fn is_cancellation(&self) -> bool {
    matches!(self, DataLoadError::Cancelled)
  }
}

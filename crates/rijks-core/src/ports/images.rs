use std::sync::Arc;

/// The one thing the search controller needs from the image cache: dropping
/// everything when a new session starts.
pub trait ImageInvalidator: Send + Sync {
  fn invalidate_all(&self);
}

impl<T> ImageInvalidator for Arc<T>
where
  T: ImageInvalidator + ?Sized,
{
  fn invalidate_all(&self) {
    (**self).invalidate_all()
  }
}

/// For controllers running without an image cache (CLI output, tests).
impl ImageInvalidator for () {
  fn invalidate_all(&self) {}
}

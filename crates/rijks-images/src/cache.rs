use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::task::{Context, Poll};

use image::DynamicImage;
use rijks_core::ports::ImageInvalidator;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::fetcher::ImageFetcher;

/// What an [`ImageTicket`] resolves to.
///
/// `image` is `None` for an absent URL, a failed download, an undecodable
/// body, or a fetch dropped by [`ImageCache::clear_cache`].
#[derive(Debug, Clone)]
pub struct ImageResponse {
  pub url: String,
  pub image: Option<Arc<DynamicImage>>,
  /// True when served from memory without a download.
  pub cached: bool,
}

impl ImageResponse {
  fn missing(url: String) -> Self {
    Self { url, image: None, cached: false }
  }
}

/// Pending result of [`ImageCache::fetch`].
///
/// Never fails: anything that goes wrong resolves to a response without an
/// image.
#[must_use = "tickets resolve only when awaited"]
pub struct ImageTicket {
  url: String,
  state: TicketState,
}

enum TicketState {
  Ready(Option<ImageResponse>),
  Waiting(oneshot::Receiver<ImageResponse>),
}

impl ImageTicket {
  fn ready(response: ImageResponse) -> Self {
    Self { url: response.url.clone(), state: TicketState::Ready(Some(response)) }
  }

  fn waiting(url: String, rx: oneshot::Receiver<ImageResponse>) -> Self {
    Self { url, state: TicketState::Waiting(rx) }
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

impl Future for ImageTicket {
  type Output = ImageResponse;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    match &mut this.state {
      TicketState::Ready(response) => {
        Poll::Ready(response.take().unwrap_or_else(|| ImageResponse::missing(this.url.clone())))
      }
      // A dropped sender means the fetch was cleared away.
      TicketState::Waiting(rx) => Pin::new(rx)
        .poll(cx)
        .map(|received| received.unwrap_or_else(|_| ImageResponse::missing(this.url.clone()))),
    }
  }
}

struct InFlight {
  epoch: u64,
  listeners: Vec<oneshot::Sender<ImageResponse>>,
  task: Option<JoinHandle<()>>,
}

/// In-memory image cache with in-flight de-duplication.
///
/// `images` and `in_flight` are never locked at the same time. Between the
/// cache lookup and the in-flight registration a download may finish, so two
/// fetches for one URL can occasionally both run; both deliver the same
/// result and the later commit wins.
///
/// `epoch` advances on every clear. A download started under an older epoch
/// neither commits to `images` nor touches the registry.
pub struct ImageCache<F> {
  fetcher: F,
  images: RwLock<HashMap<String, Arc<DynamicImage>>>,
  in_flight: Mutex<HashMap<String, InFlight>>,
  epoch: AtomicU64,
}

impl<F> ImageCache<F>
where
  F: ImageFetcher + 'static,
{
  pub fn new(fetcher: F) -> Self {
    Self {
      fetcher,
      images: RwLock::new(HashMap::new()),
      in_flight: Mutex::new(HashMap::new()),
      epoch: AtomicU64::new(0),
    }
  }

  /// Resolves `url` to an image, downloading it at most once at a time.
  ///
  /// Must be called inside a Tokio runtime when a download is needed.
  pub fn fetch(self: &Arc<Self>, url: Option<&str>) -> ImageTicket {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
      return ImageTicket::ready(ImageResponse::missing(String::new()));
    };

    if let Some(image) = self.cached(url) {
      debug!(url, "image cache hit");
      return ImageTicket::ready(ImageResponse { url: url.to_owned(), image: Some(image), cached: true });
    }

    let (tx, rx) = oneshot::channel();
    let mut in_flight = self.lock_in_flight();

    if let Some(entry) = in_flight.get_mut(url) {
      debug!(url, listeners = entry.listeners.len() + 1, "joining in-flight image download");
      entry.listeners.push(tx);
      return ImageTicket::waiting(url.to_owned(), rx);
    }

    let epoch = self.epoch.load(Ordering::SeqCst);
    let cache = Arc::clone(self);
    let owned = url.to_owned();
    let task = tokio::spawn(async move {
      let image = cache.download(&owned).await;
      cache.complete(&owned, epoch, image);
    });

    in_flight.insert(url.to_owned(), InFlight { epoch, listeners: vec![tx], task: Some(task) });
    ImageTicket::waiting(url.to_owned(), rx)
  }

  /// Drops every cached image and every in-flight download. Outstanding
  /// tickets resolve without an image.
  pub fn clear_cache(&self) {
    {
      let mut images = self.write_images();
      self.epoch.fetch_add(1, Ordering::SeqCst);
      images.clear();
    }

    let dropped: Vec<InFlight> = self.lock_in_flight().drain().map(|(_, entry)| entry).collect();
    debug!(in_flight = dropped.len(), "image cache cleared");

    for entry in dropped {
      if let Some(task) = entry.task {
        task.abort();
      }
    }
  }

  pub fn cached(&self, url: &str) -> Option<Arc<DynamicImage>> {
    self.read_images().get(url).cloned()
  }

  pub fn len(&self) -> usize {
    self.read_images().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn in_flight_count(&self) -> usize {
    self.lock_in_flight().len()
  }

  async fn download(&self, url: &str) -> Option<Arc<DynamicImage>> {
    let bytes = match self.fetcher.fetch_bytes(url).await {
      Ok(bytes) if bytes.is_empty() => {
        warn!(url, "image response had an empty body");
        return None;
      }
      Ok(bytes) => bytes,
      Err(e) => {
        warn!(url, error = %e, "image download failed");
        return None;
      }
    };

    match tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await {
      Ok(Ok(image)) => Some(Arc::new(image)),
      Ok(Err(e)) => {
        warn!(url, error = %e, "could not decode image");
        None
      }
      Err(e) => {
        warn!(url, error = %e, "image decode task failed");
        None
      }
    }
  }

  fn complete(&self, url: &str, epoch: u64, image: Option<Arc<DynamicImage>>) {
    if let Some(image) = &image {
      let mut images = self.write_images();
      if self.epoch.load(Ordering::SeqCst) != epoch {
        debug!(url, "cache cleared during download, result dropped");
        return;
      }
      images.insert(url.to_owned(), Arc::clone(image));
    }

    let entry = {
      let mut in_flight = self.lock_in_flight();
      match in_flight.get(url) {
        Some(entry) if entry.epoch == epoch => in_flight.remove(url),
        _ => None,
      }
    };

    let Some(entry) = entry else {
      return;
    };

    for listener in entry.listeners {
      // The caller may have dropped its ticket.
      let _ = listener.send(ImageResponse { url: url.to_owned(), image: image.clone(), cached: false });
    }
  }

  fn read_images(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<DynamicImage>>> {
    self.images.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write_images(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<DynamicImage>>> {
    self.images.write().unwrap_or_else(PoisonError::into_inner)
  }

  fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, InFlight>> {
    self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<F> ImageInvalidator for ImageCache<F>
where
  F: ImageFetcher + 'static,
{
  fn invalidate_all(&self) {
    self.clear_cache();
  }
}

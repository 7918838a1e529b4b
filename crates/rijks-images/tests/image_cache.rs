use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use rijks_core::ports::ImageInvalidator;
use rijks_images::{ImageCache, ImageFetchError, ImageFetcher};
use tokio::sync::Semaphore;

fn png_bytes() -> Vec<u8> {
  let mut out = Cursor::new(Vec::new());
  DynamicImage::new_rgb8(2, 2).write_to(&mut out, ImageFormat::Png).unwrap();
  out.into_inner()
}

/// Counts calls per URL. Serves a PNG unless told otherwise; optionally
/// holds every download until the gate gets a permit.
struct FakeFetcher {
  calls: AtomicUsize,
  per_url: Mutex<HashMap<String, usize>>,
  bodies: Mutex<HashMap<String, Result<Vec<u8>, ImageFetchError>>>,
  gate: Option<Arc<Semaphore>>,
}

impl FakeFetcher {
  fn new() -> Self {
    Self { calls: AtomicUsize::new(0), per_url: Mutex::default(), bodies: Mutex::default(), gate: None }
  }

  fn gated(gate: Arc<Semaphore>) -> Self {
    Self { gate: Some(gate), ..Self::new() }
  }

  fn respond(&self, url: &str, body: Result<Vec<u8>, ImageFetchError>) {
    self.bodies.lock().unwrap().insert(url.to_string(), body);
  }

  fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn calls_for(&self, url: &str) -> usize {
    self.per_url.lock().unwrap().get(url).copied().unwrap_or(0)
  }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.per_url.lock().unwrap().entry(url.to_string()).or_default() += 1;

    if let Some(gate) = &self.gate {
      gate.acquire().await.unwrap().forget();
    }

    let canned = self.bodies.lock().unwrap().get(url).cloned();
    canned.unwrap_or_else(|| Ok(png_bytes()))
  }
}

const URL: &str = "https://lh3.example/nachtwacht";

#[tokio::test]
async fn concurrent_requests_share_one_download() {
  let gate = Arc::new(Semaphore::new(0));
  let fetcher = Arc::new(FakeFetcher::gated(Arc::clone(&gate)));
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  let first = cache.fetch(Some(URL));
  let second = cache.fetch(Some(URL));
  assert_eq!(cache.in_flight_count(), 1);

  gate.add_permits(1);
  let (a, b) = tokio::join!(first, second);

  assert_eq!(fetcher.calls_for(URL), 1);
  assert!(a.image.is_some() && b.image.is_some());
  assert!(!a.cached && !b.cached);
  assert!(Arc::ptr_eq(a.image.as_ref().unwrap(), b.image.as_ref().unwrap()));
  assert_eq!(cache.in_flight_count(), 0);
}

#[tokio::test]
async fn second_request_is_served_from_memory() {
  let fetcher = Arc::new(FakeFetcher::new());
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  let first = cache.fetch(Some(URL)).await;
  assert!(first.image.is_some());
  assert_eq!(cache.len(), 1);

  let second = cache.fetch(Some(URL)).await;
  assert!(second.cached);
  assert_eq!(second.url, URL);
  assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn clearing_forces_a_fresh_download() {
  let fetcher = Arc::new(FakeFetcher::new());
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  cache.fetch(Some(URL)).await;
  cache.clear_cache();
  assert!(cache.is_empty());

  let again = cache.fetch(Some(URL)).await;
  assert!(again.image.is_some());
  assert!(!again.cached);
  assert_eq!(fetcher.calls_for(URL), 2);
}

#[tokio::test]
async fn invalidating_through_the_port_clears_the_cache() {
  let cache = Arc::new(ImageCache::new(FakeFetcher::new()));
  cache.fetch(Some(URL)).await;
  assert_eq!(cache.len(), 1);

  let invalidator: Arc<dyn ImageInvalidator> = cache.clone();
  invalidator.invalidate_all();
  assert!(cache.is_empty());
}

#[tokio::test]
async fn failures_are_not_cached() {
  let fetcher = Arc::new(FakeFetcher::new());
  fetcher.respond(URL, Err(ImageFetchError::Status(404)));
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  let response = cache.fetch(Some(URL)).await;
  assert!(response.image.is_none());
  assert!(cache.is_empty());
  assert_eq!(cache.in_flight_count(), 0);

  cache.fetch(Some(URL)).await;
  assert_eq!(fetcher.calls_for(URL), 2);
}

#[tokio::test]
async fn undecodable_and_empty_bodies_give_no_image() {
  let fetcher = Arc::new(FakeFetcher::new());
  fetcher.respond("https://img/garbage", Ok(b"definitely not a png".to_vec()));
  fetcher.respond("https://img/empty", Ok(Vec::new()));
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  assert!(cache.fetch(Some("https://img/garbage")).await.image.is_none());
  assert!(cache.fetch(Some("https://img/empty")).await.image.is_none());
  assert!(cache.is_empty());
}

#[tokio::test]
async fn missing_url_never_hits_the_network() {
  let fetcher = Arc::new(FakeFetcher::new());
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  let none = cache.fetch(None).await;
  let empty = cache.fetch(Some("")).await;

  assert!(none.image.is_none() && empty.image.is_none());
  assert_eq!(fetcher.calls(), 0);
  assert_eq!(cache.in_flight_count(), 0);
}

#[tokio::test]
async fn clearing_during_a_download_drops_its_result() {
  let gate = Arc::new(Semaphore::new(0));
  let fetcher = Arc::new(FakeFetcher::gated(Arc::clone(&gate)));
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  let ticket = cache.fetch(Some(URL));
  cache.clear_cache();
  assert_eq!(cache.in_flight_count(), 0);
  gate.add_permits(1);

  let response = ticket.await;
  assert!(response.image.is_none());
  assert_eq!(response.url, URL);
  assert!(cache.is_empty());

  // A new request after the clear starts over and does commit.
  gate.add_permits(1);
  let fresh = cache.fetch(Some(URL)).await;
  assert!(fresh.image.is_some());
  assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn different_urls_download_independently() {
  let fetcher = Arc::new(FakeFetcher::new());
  let cache = Arc::new(ImageCache::new(Arc::clone(&fetcher)));

  let (a, b) = tokio::join!(cache.fetch(Some("https://img/a")), cache.fetch(Some("https://img/b")));
  assert_eq!(a.url, "https://img/a");
  assert_eq!(b.url, "https://img/b");
  assert_eq!(fetcher.calls(), 2);
  assert_eq!(cache.len(), 2);
}

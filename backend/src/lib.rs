mod config;
mod infrastructure;

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use futures::future::join_all;
use tracing::{info, warn};

use rijks_core::domain::{ArtDetails, ArtViewModel, LoadingState};
use rijks_core::ports::{CollectionSource, ImageInvalidator};
use rijks_core::services::SearchController;
use rijks_http::RequestHandler;
use rijks_images::{HttpImageFetcher, ImageCache, ImageFetcher, ImageResponse};

pub use crate::config::AppConfig;
pub use infrastructure::logging::init_tracing;
use infrastructure::reporter::EventReporter;

/// Search the Rijksmuseum collection from the terminal.
#[derive(Debug, Parser)]
#[command(name = "rijks", version, about, long_about = None)]
pub struct Cli {
  /// Free-text search keyword, e.g. "Rembrandt van Rijn"
  pub keyword: String,

  /// Stop after this many pages
  #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
  pub pages: u32,

  /// Retry a failed page this many times before giving up
  #[arg(long, default_value_t = 1)]
  pub retries: u32,

  /// Download every item's web image through the cache and report its size
  #[arg(long)]
  pub images: bool,

  /// Show the details of the item at this (1-based) position
  #[arg(long)]
  pub select: Option<usize>,

  /// Print item details as JSON instead of a list
  #[arg(long)]
  pub json: bool,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
  // --- Wiring ---
  let config = AppConfig::load().context("loading configuration")?;

  let handler = RequestHandler::new(config.api.clone()).context("building collection client")?;
  let fetcher = HttpImageFetcher::new(&config.images).context("building image client")?;
  let images = Arc::new(ImageCache::new(fetcher));

  let mut controller = SearchController::new(handler, Arc::clone(&images), config.search.clone());
  let reporter = EventReporter::spawn(controller.subscribe());

  // --- Search ---
  let items = collect_pages(&mut controller, &cli.keyword, cli.pages, cli.retries).await?;
  info!(
    keyword = %cli.keyword,
    shown = items.len(),
    total = controller.total_available_count(),
    "search finished"
  );

  if items.is_empty() {
    println!("No results for \"{}\"", cli.keyword);
  } else if cli.json {
    let details: Vec<ArtDetails> = items.iter().map(ArtDetails::from).collect();
    println!("{}", serde_json::to_string_pretty(&details)?);
  } else {
    print_list(&items);
  }

  if cli.images && !items.is_empty() {
    for response in resolve_images(&images, &items).await {
      print_image(&response);
    }
  }

  if let Some(position) = cli.select {
    let Some(item) = position.checked_sub(1).and_then(|index| controller.select_item(index)) else {
      bail!("no item at position {position} (have {})", items.len());
    };
    print_details(&ArtDetails::from(&item));
  }

  drop(controller);
  reporter.finish().await;
  Ok(())
}

/// Runs `keyword` and pages forward until `max_pages` pages are in, the
/// server has nothing more, or a page keeps failing after `retries` retries.
pub async fn collect_pages<S, I>(
  controller: &mut SearchController<S, I>,
  keyword: &str,
  max_pages: u32,
  retries: u32,
) -> anyhow::Result<Vec<ArtViewModel>>
where
  S: CollectionSource + 'static,
  I: ImageInvalidator,
{
  controller.search(Some(keyword));
  let mut retries_left = retries;

  while controller.next_response().await {
    match controller.state().clone() {
      LoadingState::Failure(message) => {
        if retries_left == 0 {
          bail!("{message}");
        }
        retries_left -= 1;
        warn!(page = controller.current_page(), %message, "page failed, retrying");
        controller.retry_last_request();
        continue;
      }
      LoadingState::EmptyResult => break,
      _ => {}
    }

    if controller.current_page() >= max_pages || !controller.has_more_pages() {
      break;
    }
    controller.load_next_page();
  }

  Ok(controller.accumulated().to_vec())
}

/// Requests every item's web image at once; duplicates share a download.
pub async fn resolve_images<F>(cache: &Arc<ImageCache<F>>, items: &[ArtViewModel]) -> Vec<ImageResponse>
where
  F: ImageFetcher + 'static,
{
  join_all(items.iter().map(|item| cache.fetch(item.web_image_url.as_deref()))).await
}

fn print_list(items: &[ArtViewModel]) {
  for (index, item) in items.iter().enumerate() {
    println!("{:>4}. {}", index + 1, item.short_description);
  }
}

fn print_image(response: &ImageResponse) {
  let source = if response.cached { "cached" } else { "downloaded" };
  match &response.image {
    Some(image) => println!("{}: {}x{} ({source})", response.url, image.width(), image.height()),
    None if response.url.is_empty() => {}
    None => println!("{}: no image", response.url),
  }
}

fn print_details(details: &ArtDetails) {
  println!();
  println!("{}", details.short_title);
  println!("{}", details.long_title);
  println!("{}", details.artist);
  println!("{}", details.production_places);
  if let Some(url) = &details.image_url {
    println!("{url}");
  }
}

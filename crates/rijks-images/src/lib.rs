pub mod cache;
pub mod config;
pub mod fetcher;
pub mod http;

pub use cache::{ImageCache, ImageResponse, ImageTicket};
pub use config::ImageConfig;
pub use fetcher::{ImageFetchError, ImageFetcher};
pub use http::HttpImageFetcher;

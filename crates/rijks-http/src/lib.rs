pub mod config;
pub mod handler;
pub mod route;

pub use config::ApiConfig;
pub use handler::RequestHandler;
pub use route::ApiRoute;

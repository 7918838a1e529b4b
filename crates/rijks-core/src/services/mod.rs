pub mod search_controller;
pub mod settings;

pub use search_controller::{PageResponse, RequestTag, SearchController, SearchEvent};
pub use settings::SearchSettings;

pub mod collection;
pub mod images;

pub use collection::CollectionSource;
pub use images::ImageInvalidator;

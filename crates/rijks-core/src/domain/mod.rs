pub mod art_record;
pub mod details;
pub mod loading_state;
pub mod session;
pub mod view_model;

pub use art_record::{ArtRecord, CollectionPage};
pub use details::ArtDetails;
pub use loading_state::LoadingState;
pub use session::{PageOutcome, SearchSession};
pub use view_model::{ArtViewModel, project_page};

//! Song catalog: entity, storage and use cases.

mod errors;
mod models;
mod repository;
pub mod schema;
mod sqlite_song_repository;
mod use_case;

pub use errors::{ErrorClass, SongError};
pub use models::*;
pub use repository::{SongRepository, StoreCall};
pub use sqlite_song_repository::SqliteSongRepository;
pub use use_case::{couplet_at, SongUseCase, DEFAULT_STORE_TIMEOUT};

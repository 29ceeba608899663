//! Song Library Server
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod server;
pub mod song;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use song::{SongRepository, SongUseCase, SqliteSongRepository};

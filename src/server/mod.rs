pub mod config;
mod error;
mod http_layers;
pub mod server;
mod songs;
pub mod state;

pub use config::ServerConfig;
pub use error::{status_for, HttpError};
pub use http_layers::*;
pub(self) use songs::make_song_routes;
pub use server::{make_app, run_server};

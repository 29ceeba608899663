use axum::extract::FromRef;

use crate::song::SongUseCase;
use std::time::Instant;

use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub song_use_case: SongUseCase,
    pub hash: String,
}

impl FromRef<ServerState> for SongUseCase {
    fn from_ref(input: &ServerState) -> Self {
        input.song_use_case.clone()
    }
}

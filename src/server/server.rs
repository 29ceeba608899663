use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use super::{log_requests, make_song_routes, state::ServerState, ServerConfig};
use crate::song::SongUseCase;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

impl ServerState {
    fn new(config: ServerConfig, song_use_case: SongUseCase, hash: String) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            song_use_case,
            hash,
        }
    }
}

pub fn make_app(config: ServerConfig, song_use_case: SongUseCase, hash: String) -> Router {
    let state = ServerState::new(config, song_use_case, hash);

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .merge(make_song_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    info!("Shutdown signal received, stopping server");
}

pub async fn run_server(
    config: ServerConfig,
    song_use_case: SongUseCase,
    hash: String,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, song_use_case, hash);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

//! Song endpoints: boundary translation between HTTP and [`SongUseCase`].

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::song::{
    CoupletResponse, SongError, SongInfoResponse, SongRequest, SongResponse, SongUseCase,
    SongsResponse,
};

use super::state::ServerState;

#[derive(Deserialize, Debug, Default)]
pub struct SongQuery {
    pub group: Option<String>,
    pub name: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SongQuery {
    fn key(&self) -> Result<(&str, &str), SongError> {
        let group = non_empty(&self.group).ok_or(SongError::BadGroup)?;
        let name = non_empty(&self.name).ok_or(SongError::BadName)?;
        Ok((group, name))
    }

    fn limit(&self) -> Result<i64, SongError> {
        parse_count(&self.limit, || SongError::BadLimit)
    }

    fn offset(&self) -> Result<i64, SongError> {
        parse_count(&self.offset, || SongError::BadOffset)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_count(value: &Option<String>, invalid: fn() -> SongError) -> Result<i64, SongError> {
    non_empty(value)
        .ok_or_else(invalid)?
        .trim()
        .parse()
        .map_err(|_| invalid())
}

/// An empty body means no request was sent.
fn parse_body(body: &Bytes) -> Result<Option<SongRequest>, SongError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| SongError::MalformedBody(e.to_string()))
}

fn log_rejection(handler: &str) -> impl Fn(&SongError) + '_ {
    move |e| warn!("song handler: {} error: {}", handler, e)
}

type QueryResult = Result<Query<SongQuery>, QueryRejection>;

/// Undecodable query strings are reported through `SongError` so they get the
/// usual error body.
fn read_query(query: QueryResult, handler: &str) -> Result<SongQuery, SongError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| SongError::MalformedQuery(rejection.body_text()))
        .inspect_err(log_rejection(handler))
}

async fn create_song(
    State(use_case): State<SongUseCase>,
    body: Bytes,
) -> Result<Json<SongResponse>, SongError> {
    let song = parse_body(&body)
        .and_then(|request| request.map(SongRequest::into_song).transpose())
        .inspect_err(log_rejection("create"))?;

    let created = use_case.create(song).await?;
    Ok(Json(created.into()))
}

async fn delete_song(
    State(use_case): State<SongUseCase>,
    query: QueryResult,
) -> Result<StatusCode, SongError> {
    let query = read_query(query, "delete")?;
    let (group, name) = query.key().inspect_err(log_rejection("delete"))?;
    use_case.delete(group, name).await?;
    Ok(StatusCode::OK)
}

async fn update_song(
    State(use_case): State<SongUseCase>,
    query: QueryResult,
    body: Bytes,
) -> Result<Json<SongResponse>, SongError> {
    let query = read_query(query, "update")?;
    let (group, name) = query.key().inspect_err(log_rejection("update"))?;
    let patch = parse_body(&body)
        .and_then(|request| request.map(SongRequest::into_song).transpose())
        .inspect_err(log_rejection("update"))?;

    let updated = use_case.update(group, name, patch).await?;
    Ok(Json(updated.into()))
}

async fn list_songs(
    State(use_case): State<SongUseCase>,
    query: QueryResult,
    body: Bytes,
) -> Result<Json<SongsResponse>, SongError> {
    let query = read_query(query, "getsongs")?;
    let limit = query.limit().inspect_err(log_rejection("getsongs"))?;
    let offset = query.offset().inspect_err(log_rejection("getsongs"))?;
    let filter = parse_body(&body)
        .and_then(|request| request.unwrap_or_default().into_song())
        .inspect_err(log_rejection("getsongs"))?;

    let songs = use_case.get_songs(Some(filter), limit, offset).await?;
    Ok(Json(SongsResponse {
        songs: songs.into_iter().map(SongResponse::from).collect(),
    }))
}

async fn get_song_info(
    State(use_case): State<SongUseCase>,
    query: QueryResult,
) -> Result<Json<SongInfoResponse>, SongError> {
    let query = read_query(query, "get")?;
    let (group, name) = query.key().inspect_err(log_rejection("get"))?;
    let song = use_case.get(group, name).await?;
    Ok(Json(song.into()))
}

async fn get_couplet(
    State(use_case): State<SongUseCase>,
    query: QueryResult,
) -> Result<Json<CoupletResponse>, SongError> {
    let query = read_query(query, "getcouplet")?;
    let (group, name) = query.key().inspect_err(log_rejection("getcouplet"))?;
    let offset = query.offset().inspect_err(log_rejection("getcouplet"))?;
    let couplet = use_case.get_couplet(group, name, offset).await?;
    Ok(Json(CoupletResponse { couplet }))
}

pub fn make_song_routes(state: ServerState) -> Router {
    Router::new()
        .route(
            "/songs",
            get(list_songs)
                .post(create_song)
                .patch(update_song)
                .delete(delete_song),
        )
        .route("/songs/couplet", get(get_couplet))
        .route("/info", get(get_song_info))
        .with_state(state)
}

//! Input validation and timeouts in front of the song repository.

use super::{Song, SongError, SongRepository, StoreCall};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

const COUPLET_SEPARATOR: &str = "\n\n";

#[derive(Clone)]
pub struct SongUseCase {
    repository: Arc<dyn SongRepository>,
    store_timeout: Duration,
}

fn require_key(group: &str, name: &str) -> Result<(), SongError> {
    if group.trim().is_empty() {
        return Err(SongError::BadGroup);
    }
    if name.trim().is_empty() {
        return Err(SongError::BadName);
    }
    Ok(())
}

/// Splits lyric text on blank lines and returns the 1-based `offset`-th
/// paragraph.
pub fn couplet_at(text: &str, offset: i64) -> Result<&str, SongError> {
    if offset < 1 {
        return Err(SongError::BadOffset);
    }
    text.split(COUPLET_SEPARATOR)
        .nth((offset - 1) as usize)
        .ok_or(SongError::BadOffset)
}

impl SongUseCase {
    pub fn new(repository: Arc<dyn SongRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Runs a repository call on the blocking pool, bounded by the store timeout.
    /// On timeout the call is cancelled, so it fails without leaving a write behind.
    async fn with_store<T, F>(&self, op: F) -> Result<T, SongError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SongRepository, &StoreCall) -> Result<T, SongError> + Send + 'static,
    {
        let repository = self.repository.clone();
        let call = StoreCall::default();
        let task_call = call.clone();
        let task = tokio::task::spawn_blocking(move || op(repository.as_ref(), &task_call));
        match tokio::time::timeout(self.store_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                warn!("store task failed: {}", join_err);
                Err(SongError::InternalServer)
            }
            Err(_) => {
                warn!("store call exceeded {:?}, cancelling", self.store_timeout);
                call.cancel();
                Err(SongError::Timeout)
            }
        }
    }

    pub async fn create(&self, song: Option<Song>) -> Result<Song, SongError> {
        let Some(song) = song else {
            warn!("create error: nil request");
            return Err(SongError::NilRequest);
        };
        info!("create song {} - {}", song.group, song.name);
        if let Err(e) = require_key(&song.group, &song.name) {
            warn!("create error: {}", e);
            return Err(e);
        }

        let created = self
            .with_store(move |repo, call| repo.add(call, &song))
            .await
            .map_err(|e| {
                warn!("create error: {}", e);
                e.context("create error")
            })?;
        info!("successful create song");
        Ok(created)
    }

    pub async fn delete(&self, group: &str, name: &str) -> Result<(), SongError> {
        info!("delete song {} - {}", group, name);
        if let Err(e) = require_key(group, name) {
            warn!("delete error: {}", e);
            return Err(e);
        }

        let (group, name) = (group.to_string(), name.to_string());
        self.with_store(move |repo, call| repo.delete(call, &group, &name))
            .await
            .map_err(|e| {
                warn!("delete error: {}", e);
                e.context("delete error")
            })?;
        info!("successful delete");
        Ok(())
    }

    pub async fn update(
        &self,
        group: &str,
        name: &str,
        patch: Option<Song>,
    ) -> Result<Song, SongError> {
        info!("update song {} - {}", group, name);
        if let Err(e) = require_key(group, name) {
            warn!("update error: {}", e);
            return Err(e);
        }
        let Some(patch) = patch else {
            warn!("update error: nil request");
            return Err(SongError::NilRequest);
        };
        if let Err(e) = require_key(&patch.group, &patch.name) {
            warn!("update error: {}", e);
            return Err(e);
        }

        let (group, name) = (group.to_string(), name.to_string());
        let updated = self
            .with_store(move |repo, call| repo.update(call, &group, &name, &patch))
            .await
            .map_err(|e| {
                warn!("update error: {}", e);
                e.context("update error")
            })?;
        info!("successful update");
        Ok(updated)
    }

    /// Lists songs matching `filter`. `offset` is a 1-based page index:
    /// `offset - 1` rows are skipped.
    pub async fn get_songs(
        &self,
        filter: Option<Song>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Song>, SongError> {
        let Some(filter) = filter else {
            warn!("getsongs error: nil request");
            return Err(SongError::NilRequest);
        };
        info!("get songs with filter {:?}", filter);
        if limit <= 0 {
            warn!("getsongs error: bad limit {}", limit);
            return Err(SongError::BadLimit);
        }
        if offset < 1 {
            warn!("getsongs error: bad offset {}", offset);
            return Err(SongError::BadOffset);
        }

        let songs = self
            .with_store(move |repo, call| repo.get_all(call, &filter, limit, offset - 1))
            .await
            .map_err(|e| {
                warn!("getsongs error: {}", e);
                e.context("getsongs error")
            })?;
        info!("successful getsongs, {} results", songs.len());
        Ok(songs)
    }

    pub async fn get(&self, group: &str, name: &str) -> Result<Song, SongError> {
        info!("get song {} - {}", group, name);
        if let Err(e) = require_key(group, name) {
            warn!("get error: {}", e);
            return Err(e);
        }

        let (group, name) = (group.to_string(), name.to_string());
        let song = self
            .with_store(move |repo, call| repo.get(call, &group, &name))
            .await
            .map_err(|e| {
                warn!("get error: {}", e);
                e.context("get error")
            })?;
        info!("successful get song");
        Ok(song)
    }

    pub async fn get_couplet(
        &self,
        group: &str,
        name: &str,
        offset: i64,
    ) -> Result<String, SongError> {
        info!("getcouplet {} - {} #{}", group, name, offset);
        if let Err(e) = require_key(group, name) {
            warn!("getcouplet error: {}", e);
            return Err(e);
        }
        if offset < 1 {
            warn!("getcouplet error: bad offset {}", offset);
            return Err(SongError::BadOffset);
        }

        let (group, name) = (group.to_string(), name.to_string());
        let song = self
            .with_store(move |repo, call| repo.get(call, &group, &name))
            .await
            .map_err(|e| {
                warn!("getcouplet error: {}", e);
                e.context("getcouplet error")
            })?;

        couplet_at(&song.text, offset)
            .map(str::to_string)
            .map_err(|e| {
                warn!("getcouplet error: song has fewer than {} couplets", offset);
                e.context("getcouplet error")
            })
    }
}

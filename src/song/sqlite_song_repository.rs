//! SQLite-backed song storage.

use super::schema::SONGS_VERSIONED_SCHEMAS;
use super::{Song, SongError, SongRepository, StoreCall};
use crate::sqlite_persistence::open_versioned_db;
use anyhow::Result;
use rusqlite::{params, Connection, ErrorCode, InterruptHandle, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::repository::RunningCall;

const SONG_COLUMNS: &str = "song_group, name, release_date, text, link";

#[derive(Clone)]
pub struct SqliteSongRepository {
    conn: Arc<Mutex<Connection>>,
    interrupt_handle: Arc<InterruptHandle>,
}

impl SqliteSongRepository {
    /// Opens the songs database at `db_path`, creating it with the latest
    /// schema if missing, otherwise validating and migrating it.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path, SONGS_VERSIONED_SCHEMAS, "songs")?;
        Ok(Self::from_connection(conn))
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        use anyhow::Context;

        let conn = Connection::open_in_memory()?;
        SONGS_VERSIONED_SCHEMAS
            .last()
            .context("No schemas defined")?
            .create(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        SqliteSongRepository {
            interrupt_handle: Arc::new(conn.get_interrupt_handle()),
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn row_to_song(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            group: row.get("song_group")?,
            name: row.get("name")?,
            release_date: row.get("release_date")?,
            text: row.get("text")?,
            link: row.get("link")?,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SongError> {
        self.conn.lock().map_err(|_| SongError::InternalServer)
    }

    /// Ties `call` to the statement about to run on the connection, so that
    /// cancelling it interrupts that statement. Must be taken after `lock()`.
    fn track<'a>(&self, call: &'a StoreCall) -> Result<RunningCall<'a>, SongError> {
        let handle = self.interrupt_handle.clone();
        call.start(move || handle.interrupt())
    }

    /// A cancelled call rolls back instead of committing.
    fn commit(
        tx: Transaction<'_>,
        call: &StoreCall,
        failed: fn(rusqlite::Error) -> SongError,
    ) -> Result<(), SongError> {
        if call.is_cancelled() {
            warn!("store call cancelled, rolling back");
            return Err(SongError::Timeout);
        }
        tx.commit().map_err(|e| store_error(e, failed))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn is_interrupted(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted
    )
}

fn store_error(err: rusqlite::Error, failed: fn(rusqlite::Error) -> SongError) -> SongError {
    if is_unique_violation(&err) {
        SongError::AlreadyExists
    } else if is_interrupted(&err) {
        SongError::Timeout
    } else {
        failed(err)
    }
}

/// Builds the conjunctive WHERE terms for every non-empty filter field.
/// Values are returned separately and bound as parameters, numbered from
/// `first_param`.
fn filter_clauses(
    filter: &Song,
    first_param: usize,
) -> (Vec<String>, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    let mut push = |column: &str, value: Box<dyn rusqlite::ToSql>| {
        clauses.push(format!("{} = ?{}", column, first_param + values.len()));
        values.push(value);
    };

    if !filter.group.is_empty() {
        push("song_group", Box::new(filter.group.clone()));
    }
    if !filter.name.is_empty() {
        push("name", Box::new(filter.name.clone()));
    }
    if let Some(date) = filter.release_date {
        push("release_date", Box::new(date));
    }
    if !filter.text.is_empty() {
        push("text", Box::new(filter.text.clone()));
    }
    if !filter.link.is_empty() {
        push("link", Box::new(filter.link.clone()));
    }

    (clauses, values)
}

impl SongRepository for SqliteSongRepository {
    fn add(&self, call: &StoreCall, song: &Song) -> Result<Song, SongError> {
        info!("add new song {} - {}", song.group, song.name);
        let mut conn = self.lock()?;
        let _running = self.track(call)?;

        let tx = conn
            .transaction()
            .map_err(|e| store_error(e, SongError::AddFailed))?;
        let created = tx
            .query_row(
                &format!(
                    "INSERT INTO songs ({SONG_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {SONG_COLUMNS}"
                ),
                params![song.group, song.name, song.release_date, song.text, song.link],
                Self::row_to_song,
            )
            .map_err(|e| {
                warn!("add error: {}", e);
                store_error(e, SongError::AddFailed)
            })?;
        Self::commit(tx, call, SongError::AddFailed)?;

        info!("successful adding new song");
        Ok(created)
    }

    fn delete(&self, call: &StoreCall, group: &str, name: &str) -> Result<(), SongError> {
        info!("delete song {} - {}", group, name);
        let mut conn = self.lock()?;
        let _running = self.track(call)?;

        let tx = conn
            .transaction()
            .map_err(|e| store_error(e, SongError::DeleteFailed))?;
        let deleted = tx
            .execute(
                "DELETE FROM songs WHERE song_group = ?1 AND name = ?2",
                params![group, name],
            )
            .map_err(|e| {
                warn!("delete error: {}", e);
                store_error(e, SongError::DeleteFailed)
            })?;
        Self::commit(tx, call, SongError::DeleteFailed)?;

        debug!("deleted {} rows", deleted);
        Ok(())
    }

    fn update(
        &self,
        call: &StoreCall,
        group: &str,
        name: &str,
        patch: &Song,
    ) -> Result<Song, SongError> {
        info!("update song {} - {}", group, name);
        let mut conn = self.lock()?;
        let _running = self.track(call)?;

        let tx = conn
            .transaction()
            .map_err(|e| store_error(e, SongError::UpdateFailed))?;
        let updated = tx
            .query_row(
                &format!(
                    "UPDATE songs SET song_group = ?1, name = ?2, release_date = ?3, text = ?4, link = ?5
                     WHERE song_group = ?6 AND name = ?7
                     RETURNING {SONG_COLUMNS}"
                ),
                params![
                    patch.group,
                    patch.name,
                    patch.release_date,
                    patch.text,
                    patch.link,
                    group,
                    name
                ],
                Self::row_to_song,
            )
            .optional()
            .map_err(|e| {
                warn!("update error: {}", e);
                store_error(e, SongError::UpdateFailed)
            })?
            .ok_or(SongError::NotFound)?;
        Self::commit(tx, call, SongError::UpdateFailed)?;

        Ok(updated)
    }

    fn get(&self, call: &StoreCall, group: &str, name: &str) -> Result<Song, SongError> {
        info!("get song {} - {}", group, name);
        let conn = self.lock()?;
        let _running = self.track(call)?;

        conn.query_row(
            &format!("SELECT {SONG_COLUMNS} FROM songs WHERE song_group = ?1 AND name = ?2"),
            params![group, name],
            Self::row_to_song,
        )
        .optional()
        .map_err(|e| {
            warn!("get error: {}", e);
            store_error(e, SongError::GetFailed)
        })?
        .ok_or(SongError::NotFound)
    }

    fn get_all(
        &self,
        call: &StoreCall,
        filter: &Song,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Song>, SongError> {
        let (clauses, mut values) = filter_clauses(filter, 3);
        let mut sql = format!("SELECT {SONG_COLUMNS} FROM songs");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id LIMIT ?1 OFFSET ?2");
        debug!("filter songs: {}", sql);

        values.insert(0, Box::new(offset));
        values.insert(0, Box::new(limit));
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();

        let conn = self.lock()?;
        let _running = self.track(call)?;

        let mut stmt = conn.prepare(&sql).map_err(|e| {
            warn!("getall error: {}", e);
            store_error(e, SongError::ListFailed)
        })?;
        let rows = stmt
            .query_map(params_refs.as_slice(), Self::row_to_song)
            .map_err(|e| {
                warn!("getall error: {}", e);
                store_error(e, SongError::ListFailed)
            })?;

        let mut songs = Vec::new();
        for row in rows {
            match row {
                Ok(song) => songs.push(song),
                Err(e) if is_interrupted(&e) => return Err(SongError::Timeout),
                Err(e) => warn!("getall error, skipping row: {}", e),
            }
        }
        Ok(songs)
    }
}

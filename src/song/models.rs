//! Song entity and its wire representations.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::SongError;

/// External text layout of release dates, e.g. `16.07.2006`.
pub const RELEASE_DATE_FORMAT: &str = "%d.%m.%Y";

/// A song row. Also used as a listing filter, where empty strings and a
/// `None` release date mean "don't filter on this field".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Song {
    pub group: String,
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub text: String,
    pub link: String,
}

fn release_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(0[1-9]|[12][0-9]|3[01])\.(0[1-9]|1[0-2])\.(\d{4})$")
            .expect("release date pattern is valid")
    })
}

/// Parses a `DD.MM.YYYY` release date. An empty string means the date was
/// not provided.
pub fn parse_release_date(s: &str) -> Result<Option<NaiveDate>, SongError> {
    if s.is_empty() {
        return Ok(None);
    }
    if !release_date_regex().is_match(s) {
        return Err(SongError::BadReleaseDate);
    }
    NaiveDate::parse_from_str(s, RELEASE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| SongError::BadReleaseDate)
}

pub fn format_release_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(RELEASE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Body of create, update and list requests.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SongRequest {
    pub group: String,
    pub name: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl SongRequest {
    pub fn into_song(self) -> Result<Song, SongError> {
        Ok(Song {
            release_date: parse_release_date(&self.release_date)?,
            group: self.group,
            name: self.name,
            text: self.text,
            link: self.link,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SongResponse {
    pub group: String,
    pub name: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl From<Song> for SongResponse {
    fn from(song: Song) -> Self {
        SongResponse {
            release_date: format_release_date(song.release_date),
            group: song.group,
            name: song.name,
            text: song.text,
            link: song.link,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SongsResponse {
    pub songs: Vec<SongResponse>,
}

/// Payload of `GET /info`.
#[derive(Serialize, Deserialize, Debug)]
pub struct SongInfoResponse {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl From<Song> for SongInfoResponse {
    fn from(song: Song) -> Self {
        SongInfoResponse {
            release_date: format_release_date(song.release_date),
            text: song.text,
            link: song.link,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CoupletResponse {
    pub couplet: String,
}

//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all song endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Song Endpoints
    // ========================================================================

    /// POST /songs
    pub async fn create_song(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/songs", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Create song request failed")
    }

    /// POST /songs with a raw body
    pub async fn create_song_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/songs", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Create song request failed")
    }

    /// Creates the reference song with all fields set
    ///
    /// # Panics
    ///
    /// Panics if the song is not created.
    pub async fn create_supermassive(&self) {
        let response = self
            .create_song(json!({
                "group": GROUP_MUSE,
                "name": SONG_SUPERMASSIVE,
                "release_date": SUPERMASSIVE_RELEASE_DATE,
                "text": SUPERMASSIVE_TEXT,
                "link": SUPERMASSIVE_LINK,
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    /// DELETE /songs?group=..&name=..
    pub async fn delete_song(&self, group: &str, name: &str) -> Response {
        self.client
            .delete(format!("{}/songs", self.base_url))
            .query(&[("group", group), ("name", name)])
            .send()
            .await
            .expect("Delete song request failed")
    }

    /// PATCH /songs?group=..&name=..
    pub async fn update_song(&self, group: &str, name: &str, body: Value) -> Response {
        self.client
            .patch(format!("{}/songs", self.base_url))
            .query(&[("group", group), ("name", name)])
            .json(&body)
            .send()
            .await
            .expect("Update song request failed")
    }

    /// GET /songs?limit=..&offset=.. with a JSON filter body
    pub async fn get_songs(&self, limit: &str, offset: &str, filter: Option<Value>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/songs", self.base_url))
            .query(&[("limit", limit), ("offset", offset)]);
        if let Some(filter) = filter {
            request = request.json(&filter);
        }
        request.send().await.expect("Get songs request failed")
    }

    /// GET /info?group=..&name=..
    pub async fn get_info(&self, group: &str, name: &str) -> Response {
        self.client
            .get(format!("{}/info", self.base_url))
            .query(&[("group", group), ("name", name)])
            .send()
            .await
            .expect("Get info request failed")
    }

    /// GET /songs/couplet?group=..&name=..&offset=..
    pub async fn get_couplet(&self, group: &str, name: &str, offset: &str) -> Response {
        self.client
            .get(format!("{}/songs/couplet", self.base_url))
            .query(&[("group", group), ("name", name), ("offset", offset)])
            .send()
            .await
            .expect("Get couplet request failed")
    }
}

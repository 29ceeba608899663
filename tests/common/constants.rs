//! Shared constants for end-to-end tests

// ============================================================================
// Test Songs
// ============================================================================

pub const GROUP_MUSE: &str = "Muse";

pub const SONG_SUPERMASSIVE: &str = "Supermassive Black Hole";

pub const SONG_UPRISING: &str = "Uprising";

pub const GROUP_RADIOHEAD: &str = "Radiohead";

pub const SONG_CREEP: &str = "Creep";

/// Release date of "Supermassive Black Hole", in wire format
pub const SUPERMASSIVE_RELEASE_DATE: &str = "16.07.2006";

/// Two couplets separated by a blank line
pub const SUPERMASSIVE_TEXT: &str =
    "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\nI thought I was a fool for no one\nOh baby, I'm a fool for you";

pub const SUPERMASSIVE_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Hash reported by the test server on `GET /`
pub const TEST_SERVER_HASH: &str = "e2e-test";

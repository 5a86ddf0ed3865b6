//! Lyrics engine: data model, providers, on-disk cache and the fetch pipeline.

pub mod ai;
pub mod cache;
pub mod genius;
pub mod lrclib;
pub mod parser;
pub mod service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One synced lyric line. `timestamp` is seconds from track start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub timestamp: f64,
    pub text: String,
}

/// A fetched song. Exactly one of `lyrics` / `synced_lines` is authoritative,
/// selected by `has_synced`.
#[derive(Debug, Clone, Default)]
pub struct Song {
    pub artist: String,
    pub title: String,
    pub lyrics: String,
    pub synced_lines: Vec<Line>,
    pub has_synced: bool,
}

/// On-disk cache record: a song plus the user's timing correction.
/// The serde renames are the cache file format and must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSong {
    pub artist: String,
    pub title: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(rename = "syncedLyrics", default)]
    pub synced_lines: Vec<Line>,
    #[serde(rename = "hasSyncedLyrics", default)]
    pub has_synced: bool,
    #[serde(default)]
    pub offset: f64,
}

impl CachedSong {
    pub fn into_song(self) -> Song {
        Song {
            artist: self.artist,
            title: self.title,
            lyrics: self.lyrics,
            synced_lines: self.synced_lines,
            has_synced: self.has_synced,
        }
    }
}

/// An `(artist, title)` pair from a cache listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSongEntry {
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not serve this kind of lyrics at all.
    #[error("not supported by this provider")]
    Unsupported,
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("no lyrics found")]
    NotFound,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A source of lyrics. A provider that cannot serve one of the two kinds
/// returns [`ProviderError::Unsupported`], never an empty success.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Plain, untimed lyrics text.
    async fn fetch_lyrics(&self, artist: &str, title: &str) -> Result<String, ProviderError>;

    /// Time-synced lines, in the order the source emits them.
    async fn fetch_synced(&self, artist: &str, title: &str) -> Result<Vec<Line>, ProviderError>;
}

//! LRCLIB provider.
//!
//! LRCLIB is a free lyrics API serving synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use async_trait::async_trait;
use serde::Deserialize;

use crate::lyrics::{parser, Line, LyricsProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct LrclibResponse {
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
}

/// Synced-only provider. Plain lyrics requests are `Unsupported`.
#[derive(Debug, Clone)]
pub struct LrclibProvider {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibProvider {
    const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = "lyra/0.1.0 (https://github.com/lyra)";

    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to create reqwest client"),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for LrclibProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LyricsProvider for LrclibProvider {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn fetch_lyrics(&self, _artist: &str, _title: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Unsupported)
    }

    async fn fetch_synced(&self, artist: &str, title: &str) -> Result<Vec<Line>, ProviderError> {
        let url = format!(
            "{}/get?artist_name={}&track_name={}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let body: LrclibResponse = response.json().await?;
        let synced = body.synced_lyrics.unwrap_or_default();
        if synced.is_empty() {
            return Err(ProviderError::NotFound);
        }
        Ok(parser::parse_lrc(&synced))
    }
}

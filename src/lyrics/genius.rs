//! Genius provider: API search for the song page, then scrape the lyrics
//! containers out of the page HTML.

use async_trait::async_trait;
use serde::Deserialize;

use crate::lyrics::{Line, LyricsProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    url: String,
}

/// Plain-only provider. Synced requests are `Unsupported`.
#[derive(Debug, Clone)]
pub struct GeniusProvider {
    client: reqwest::Client,
    token: Option<String>,
}

impl GeniusProvider {
    const API_BASE_URL: &'static str = "https://api.genius.com";
    const USER_AGENT: &'static str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to create reqwest client"),
            token,
        }
    }

    async fn find_song_url(&self, token: &str, artist: &str, title: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/search?q={}",
            Self::API_BASE_URL,
            urlencoding::encode(&format!("{artist} {title}"))
        );
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }
        let body: SearchResponse = response.json().await?;
        body.response
            .hits
            .into_iter()
            .next()
            .map(|hit| hit.result.url)
            .ok_or(ProviderError::NotFound)
    }

    async fn scrape_lyrics(&self, page_url: &str) -> Result<String, ProviderError> {
        let response = self.client.get(page_url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }
        let html = response.text().await?;
        let lyrics = extract_lyrics_from_page(&html);
        if lyrics.is_empty() {
            return Err(ProviderError::NotFound);
        }
        Ok(lyrics)
    }
}

#[async_trait]
impl LyricsProvider for GeniusProvider {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch_lyrics(&self, artist: &str, title: &str) -> Result<String, ProviderError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ProviderError::MissingCredential("GENIUS_ACCESS_TOKEN"))?;
        let page_url = self.find_song_url(token, artist, title).await?;
        self.scrape_lyrics(&page_url).await
    }

    async fn fetch_synced(&self, _artist: &str, _title: &str) -> Result<Vec<Line>, ProviderError> {
        Err(ProviderError::Unsupported)
    }
}

const CONTAINER_MARKER: &str = "data-lyrics-container=\"true\"";

/// Pull the text out of every lyrics container div on a Genius song page,
/// blocks separated by blank lines.
fn extract_lyrics_from_page(html: &str) -> String {
    let mut blocks = Vec::new();
    let mut rest = html;
    while let Some(marker) = rest.find(CONTAINER_MARKER) {
        let after_marker = &rest[marker + CONTAINER_MARKER.len()..];
        let Some(tag_end) = after_marker.find('>') else { break };
        let body = &after_marker[tag_end + 1..];
        // non-greedy like the page markup expects: containers hold no nested divs
        let Some(div_end) = body.find("</div>") else { break };
        let text = strip_html(&body[..div_end]);
        let text = text.trim();
        if !text.is_empty() {
            blocks.push(text.to_string());
        }
        rest = &body[div_end..];
    }
    blocks.join("\n\n").trim().to_string()
}

/// Turn `<br>` variants into newlines, drop every other tag, decode the
/// handful of entities Genius emits.
fn strip_html(block: &str) -> String {
    let mut out = String::with_capacity(block.len());
    let mut rest = block;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) => {
                if after[..close].trim_start().to_ascii_lowercase().starts_with("br") {
                    out.push('\n');
                }
                rest = &after[close + 1..];
            }
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    decode_entities(&out)
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

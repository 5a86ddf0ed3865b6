//! AI provider over an OpenAI-compatible chat completions endpoint.
//!
//! One provider serves both kinds of lyrics and also parses free-form
//! search queries. Works against api.openai.com and local servers that
//! speak the same protocol (Ollama's `/v1` for example); the only
//! differences are the base URL, model name and whether a key is sent.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::lyrics::{parser, Line, LyricsProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ParsedQuery {
    artist: String,
    title: String,
}

#[derive(Debug, Clone)]
pub struct AiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl AiProvider {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("failed to create reqwest client"),
            base_url,
            model,
            api_key,
        }
    }

    async fn chat(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Malformed("no choices in response".into()))
    }

    /// Split a free-form query like "that daft punk song one more time"
    /// into an `(artist, title)` pair.
    pub async fn parse_query(&self, query: &str) -> Result<(String, String), ProviderError> {
        let prompt = format!(
            "Identify the artist and song title in this query: \"{query}\". \
             Respond with only a JSON object of the form \
             {{\"artist\": \"...\", \"title\": \"...\"}} and nothing else."
        );
        let answer = self.chat(&prompt).await?;
        let parsed: ParsedQuery = serde_json::from_str(extract_json_object(&answer))
            .map_err(|e| ProviderError::Malformed(format!("query parse: {e}")))?;
        if parsed.artist.is_empty() || parsed.title.is_empty() {
            return Err(ProviderError::Malformed("empty artist or title".into()));
        }
        Ok((parsed.artist, parsed.title))
    }
}

/// Models like to wrap JSON in prose or code fences; keep only the
/// outermost `{...}` span.
fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

#[async_trait]
impl LyricsProvider for AiProvider {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn fetch_lyrics(&self, artist: &str, title: &str) -> Result<String, ProviderError> {
        let prompt = format!(
            "Write out the complete lyrics of the song \"{title}\" by {artist}. \
             Respond with the lyrics wrapped in <lyrics></lyrics> tags and nothing else."
        );
        let answer = self.chat(&prompt).await?;
        let lyrics = parser::extract_between_tags(&answer, "lyrics");
        if lyrics.trim().is_empty() {
            return Err(ProviderError::NotFound);
        }
        Ok(lyrics)
    }

    async fn fetch_synced(&self, artist: &str, title: &str) -> Result<Vec<Line>, ProviderError> {
        let prompt = format!(
            "Write out the complete lyrics of the song \"{title}\" by {artist} \
             as WebVTT cues, one cue per lyric line with realistic timings, \
             like:\n00:12.000 --> 00:15.000\nFirst lyric line\n\n\
             Respond with the cues wrapped in <lyrics></lyrics> tags and nothing else."
        );
        let answer = self.chat(&prompt).await?;
        let lines = parser::parse_vtt(&parser::extract_between_tags(&answer, "lyrics"));
        if lines.is_empty() {
            return Err(ProviderError::NotFound);
        }
        Ok(lines)
    }
}

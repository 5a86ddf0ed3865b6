//! Fetch pipeline: cache first, then the synced provider, then the plain
//! provider, persisting whatever a provider returns.

use thiserror::Error;
use tracing::{debug, warn};

use crate::lyrics::cache::{CacheError, SongCache};
use crate::lyrics::{CachedSong, CachedSongEntry, LyricsProvider, ProviderError, Song};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("all providers failed: {plain}")]
    AllProvidersFailed {
        synced: ProviderError,
        plain: ProviderError,
    },
}

pub struct LyricsService {
    synced_provider: Box<dyn LyricsProvider>,
    plain_provider: Box<dyn LyricsProvider>,
    cache: SongCache,
}

impl LyricsService {
    pub fn new(
        synced_provider: Box<dyn LyricsProvider>,
        plain_provider: Box<dyn LyricsProvider>,
        cache: SongCache,
    ) -> Self {
        Self {
            synced_provider,
            plain_provider,
            cache,
        }
    }

    /// Resolve lyrics for a song. Cache hits short-circuit; a fresh result
    /// is persisted with a zero offset before being returned. Persistence
    /// failures are logged, never surfaced.
    pub async fn fetch(&self, artist: &str, title: &str) -> Result<Song, FetchError> {
        let cache = self.cache.clone();
        let (cache_artist, cache_title) = (artist.to_string(), title.to_string());
        let cached =
            tokio::task::spawn_blocking(move || cache.load(&cache_artist, &cache_title)).await;
        if let Ok(Ok(cached)) = cached {
            debug!("cache hit for {} - {}", artist, title);
            return Ok(cached.into_song());
        }

        let synced_err = match self.synced_provider.fetch_synced(artist, title).await {
            Ok(lines) if !lines.is_empty() => {
                let song = Song {
                    artist: artist.to_string(),
                    title: title.to_string(),
                    lyrics: String::new(),
                    synced_lines: lines,
                    has_synced: true,
                };
                self.persist(&song);
                return Ok(song);
            }
            Ok(_) => ProviderError::NotFound,
            Err(e) => {
                debug!(
                    "synced provider {} failed for {} - {}: {}",
                    self.synced_provider.name(),
                    artist,
                    title,
                    e
                );
                e
            }
        };

        match self.plain_provider.fetch_lyrics(artist, title).await {
            Ok(text) => {
                let song = Song {
                    artist: artist.to_string(),
                    title: title.to_string(),
                    lyrics: text,
                    synced_lines: Vec::new(),
                    has_synced: false,
                };
                self.persist(&song);
                Ok(song)
            }
            Err(plain) => Err(FetchError::AllProvidersFailed {
                synced: synced_err,
                plain,
            }),
        }
    }

    /// Cache lookup without touching any provider. The stored offset comes
    /// back alongside the song.
    pub fn load_cached(&self, artist: &str, title: &str) -> Result<CachedSong, CacheError> {
        self.cache.load(artist, title)
    }

    pub fn list_cached(&self) -> Vec<CachedSongEntry> {
        self.cache.list_all()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.count()
    }

    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear_all()
    }

    pub fn update_offset(&self, artist: &str, title: &str, offset: f64) -> Result<(), CacheError> {
        self.cache.update_offset(artist, title, offset)
    }

    fn persist(&self, song: &Song) {
        // a record always carries both halves of its key
        if song.artist.is_empty() || song.title.is_empty() {
            debug!("not caching song with empty artist or title");
            return;
        }
        let record = CachedSong {
            artist: song.artist.clone(),
            title: song.title.clone(),
            lyrics: song.lyrics.clone(),
            synced_lines: song.synced_lines.clone(),
            has_synced: song.has_synced,
            offset: 0.0,
        };
        if let Err(e) = self.cache.save(&record) {
            warn!("cache write failed for {} - {}: {}", song.artist, song.title, e);
        }
    }
}

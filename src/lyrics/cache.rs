//! On-disk song cache: one pretty-printed JSON file per `(artist, title)`.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::lyrics::{CachedSong, CachedSongEntry};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("not cached")]
    NotFound,
    #[error("cache io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode cache record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SongCache {
    dir: PathBuf,
}

impl SongCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load a cached record. A missing file and a corrupt one both come back
    /// as `NotFound`; the next successful fetch overwrites a corrupt record.
    pub fn load(&self, artist: &str, title: &str) -> Result<CachedSong, CacheError> {
        let path = self.record_path(artist, title);
        let data = fs::read(&path).map_err(|_| CacheError::NotFound)?;
        serde_json::from_slice(&data).map_err(|e| {
            warn!("corrupt cache record {}: {}", path.display(), e);
            CacheError::NotFound
        })
    }

    pub fn save(&self, song: &CachedSong) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_vec_pretty(song)?;
        fs::write(self.record_path(&song.artist, &song.title), data)?;
        Ok(())
    }

    /// Rewrite only the offset of an existing record.
    pub fn update_offset(&self, artist: &str, title: &str, offset: f64) -> Result<(), CacheError> {
        let mut cached = self.load(artist, title)?;
        cached.offset = offset;
        self.save(&cached)
    }

    /// List every readable record, unreadable ones are skipped.
    pub fn list_all(&self) -> Vec<CachedSongEntry> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut songs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Ok(data) = fs::read(&path) else { continue };
            match serde_json::from_slice::<CachedSong>(&data) {
                Ok(song) => songs.push(CachedSongEntry {
                    artist: song.artist,
                    title: song.title,
                }),
                Err(e) => warn!("skipping corrupt cache record {}: {}", path.display(), e),
            }
        }
        songs.sort_by(|a, b| (&a.artist, &a.title).cmp(&(&b.artist, &b.title)));
        songs
    }

    pub fn count(&self) -> usize {
        self.list_all().len()
    }

    /// Delete every `.json` record in the cache directory.
    pub fn clear_all(&self) -> Result<(), CacheError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    fn record_path(&self, artist: &str, title: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", normalize_key(artist), normalize_key(title)))
    }
}

/// Normalize a name into a filename-safe key: lower-case, every run of
/// characters outside `[a-z0-9]` becomes a single `_`, leading and trailing
/// separators dropped. Distinct names can collide on purpose so that case
/// and punctuation variants share one record.
pub fn normalize_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_sep = false;
    for c in s.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

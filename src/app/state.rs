use std::time::Instant;

use crate::lyrics::{CachedSongEntry, Line, Song};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    Search,
    CachedSongs,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub should_quit: bool,

    // song currently shown in the lyrics view
    pub artist: String,
    pub title: String,
    pub lyrics: String,
    pub synced_lines: Vec<Line>,
    pub has_synced: bool,

    // live playback
    pub position_secs: f64,
    pub duration_secs: f64,
    pub offset_secs: f64,
    /// Position reports before this instant are dropped; armed around a
    /// song change so a stale position cannot highlight the wrong line.
    pub ignore_position_until: Option<Instant>,

    // host player tracking
    pub auto_detect: bool,
    /// Last `"artist - title"` key seen from the player; repeated polls of
    /// the same song are no-ops.
    pub last_detected_key: Option<String>,
    /// Key of the fetch in flight; completions for any other key are stale.
    pub pending_song_key: Option<String>,
    pub player_artist: String,
    pub player_title: String,

    // lyrics view
    pub follow: bool,
    pub scroll_offset: usize,
    pub viewport_height: usize,
    pub searching: bool,
    /// Shown in the lyrics panel when nothing is loaded.
    pub status: String,

    pub modal: Modal,
    pub search_input: String,
    pub cached_songs: Vec<CachedSongEntry>,
    pub cached_filter: String,
    pub cached_cursor: usize,

    pub toast: Option<Toast>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            artist: String::new(),
            title: String::new(),
            lyrics: String::new(),
            synced_lines: Vec::new(),
            has_synced: false,
            position_secs: 0.0,
            duration_secs: 0.0,
            offset_secs: 0.0,
            ignore_position_until: None,
            auto_detect: true,
            last_detected_key: None,
            pending_song_key: None,
            player_artist: String::new(),
            player_title: String::new(),
            follow: true,
            scroll_offset: 0,
            viewport_height: 0,
            searching: false,
            status: String::new(),
            modal: Modal::None,
            search_input: String::new(),
            cached_songs: Vec::new(),
            cached_filter: String::new(),
            cached_cursor: 0,
            toast: None,
        }
    }

    pub fn song_loaded(&self) -> bool {
        self.has_synced || !self.lyrics.is_empty()
    }

    /// Replace the displayed song.
    pub fn install_song(&mut self, song: Song, offset: f64) {
        self.artist = song.artist;
        self.title = song.title;
        self.lyrics = song.lyrics;
        self.synced_lines = song.synced_lines;
        self.has_synced = song.has_synced;
        self.offset_secs = offset;
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
        self.scroll_offset = 0;
        self.status.clear();
    }

    pub fn clear_song(&mut self) {
        self.artist.clear();
        self.title.clear();
        self.lyrics.clear();
        self.synced_lines.clear();
        self.has_synced = false;
        self.offset_secs = 0.0;
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
        self.scroll_offset = 0;
    }

    /// Index of the synced line the playhead is on, `None` before the first
    /// line. The user offset shifts the effective position.
    pub fn current_line_index(&self) -> Option<usize> {
        current_line_index(self.position_secs, self.offset_secs, &self.synced_lines)
    }

    /// Cached entries matching the filter, case-insensitively, against
    /// either half of the name.
    pub fn filtered_cached(&self) -> Vec<&CachedSongEntry> {
        if self.cached_filter.is_empty() {
            return self.cached_songs.iter().collect();
        }
        let needle = self.cached_filter.to_lowercase();
        self.cached_songs
            .iter()
            .filter(|e| {
                e.artist.to_lowercase().contains(&needle)
                    || e.title.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Last line with `timestamp <= position - offset`. Lines are assumed to be
/// in non-decreasing timestamp order, as the parsers emit them.
pub fn current_line_index(position: f64, offset: f64, lines: &[Line]) -> Option<usize> {
    let adjusted = position - offset;
    lines
        .partition_point(|l| l.timestamp <= adjusted)
        .checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<Line> {
        [0.0, 5.0, 10.0, 15.0]
            .iter()
            .map(|&t| Line {
                timestamp: t,
                text: format!("line at {t}"),
            })
            .collect()
    }

    #[test]
    fn test_current_line_basic() {
        let lines = lines();
        assert_eq!(current_line_index(0.0, 0.0, &lines), Some(0));
        assert_eq!(current_line_index(4.9, 0.0, &lines), Some(0));
        assert_eq!(current_line_index(5.0, 0.0, &lines), Some(1));
        assert_eq!(current_line_index(99.0, 0.0, &lines), Some(3));
    }

    #[test]
    fn test_current_line_before_first() {
        let lines = vec![Line {
            timestamp: 3.0,
            text: "late start".into(),
        }];
        assert_eq!(current_line_index(1.0, 0.0, &lines), None);
        assert_eq!(current_line_index(0.0, 0.0, &[]), None);
    }

    #[test]
    fn test_current_line_offset_shifts_position() {
        let lines = lines();
        // positive offset means lyrics are early, so the playhead lags
        assert_eq!(current_line_index(5.0, 0.2, &lines), Some(0));
        // negative offset pushes the playhead forward
        assert_eq!(current_line_index(4.9, -0.1, &lines), Some(1));
    }

    #[test]
    fn test_filtered_cached() {
        let mut state = AppState::new();
        state.cached_songs = vec![
            CachedSongEntry {
                artist: "Radiohead".into(),
                title: "Weird Fishes".into(),
            },
            CachedSongEntry {
                artist: "Portishead".into(),
                title: "Roads".into(),
            },
        ];
        state.cached_filter = "head".into();
        assert_eq!(state.filtered_cached().len(), 2);
        state.cached_filter = "fishes".into();
        assert_eq!(state.filtered_cached().len(), 1);
        state.cached_filter = "xyz".into();
        assert!(state.filtered_cached().is_empty());
    }
}

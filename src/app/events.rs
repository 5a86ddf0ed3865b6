#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// Now-playing poll tick.
    DetectTick,
    /// Playback position poll tick.
    PositionTick,
    Player(PlayerEvent),
    Lyrics(LyricsEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    NowPlaying { artist: String, title: String },
    NothingPlaying,
    Position { position: f64, duration: f64 },
}

#[derive(Debug, Clone)]
pub enum LyricsEvent {
    /// A fetch or cache load finished. `key` ties the result back to the
    /// request so stale completions can be dropped.
    Loaded {
        key: String,
        song: crate::lyrics::Song,
        offset: f64,
        from_cache: bool,
    },
    Failed {
        key: String,
        message: String,
    },
    CachedList {
        entries: Vec<crate::lyrics::CachedSongEntry>,
    },
    CacheCleared {
        error: Option<String>,
    },
}

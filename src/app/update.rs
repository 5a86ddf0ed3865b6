//! Pure transition from `(state, event)` to side effects. Everything that
//! touches the network, the cache or the session bus is described as an
//! [`Effect`] and executed by the app loop, which keeps song switching,
//! debouncing and staleness handling unit-testable.

use std::time::{Duration, Instant};

use super::actions::Action;
use super::events::{Event, LyricsEvent, PlayerEvent};
use super::state::{AppState, Modal, Toast};
use crate::input;

/// Grace period after a detected song change during which position reports
/// (still describing the previous track) are dropped.
const DETECT_IGNORE_WINDOW: Duration = Duration::from_secs(2);
/// Shorter window re-armed once a result is installed.
const LOADED_IGNORE_WINDOW: Duration = Duration::from_secs(1);
/// Re-check delay when the playhead sits at or past the end of the track.
const END_OF_TRACK_RECHECK: Duration = Duration::from_millis(500);
const OFFSET_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    QueryNowPlaying,
    QueryPosition { delay: Option<Duration> },
    /// Cache lookup first, then the provider pipeline.
    FetchLyrics { key: String, artist: String, title: String },
    /// Free-form query: parse into artist/title, then fetch.
    SearchLyrics { key: String, query: String },
    /// Cache-only load, used by the cached-songs picker.
    LoadCachedSong { key: String, artist: String, title: String },
    ListCachedSongs,
    PersistOffset { artist: String, title: String, offset: f64 },
    ClearCache,
}

pub fn update(state: &mut AppState, event: Event) -> Vec<Effect> {
    match event {
        Event::Input(input_ev) => match input::map_input_to_action(state, input_ev) {
            Some(action) => apply(state, action),
            None => Vec::new(),
        },
        Event::DetectTick => {
            if state.auto_detect {
                vec![Effect::QueryNowPlaying]
            } else {
                Vec::new()
            }
        }
        Event::PositionTick => {
            if state.has_synced && !state.searching {
                vec![Effect::QueryPosition { delay: None }]
            } else {
                Vec::new()
            }
        }
        Event::Player(player_ev) => handle_player(state, player_ev),
        Event::Lyrics(lyrics_ev) => handle_lyrics(state, lyrics_ev),
    }
}

fn handle_player(state: &mut AppState, event: PlayerEvent) -> Vec<Effect> {
    match event {
        PlayerEvent::NowPlaying { artist, title } => {
            state.player_artist = artist.clone();
            state.player_title = title.clone();
            if !state.auto_detect {
                return Vec::new();
            }
            let key = song_key(&artist, &title);
            if state.last_detected_key.as_deref() == Some(&key) {
                return Vec::new();
            }
            state.last_detected_key = Some(key.clone());
            state.pending_song_key = Some(key.clone());
            state.searching = true;
            state.clear_song();
            state.status = format!("Fetching lyrics for {artist} - {title}...");
            state.ignore_position_until = Some(Instant::now() + DETECT_IGNORE_WINDOW);
            vec![Effect::FetchLyrics { key, artist, title }]
        }
        PlayerEvent::NothingPlaying => {
            state.player_artist.clear();
            state.player_title.clear();
            Vec::new()
        }
        PlayerEvent::Position { position, duration } => {
            if state.searching {
                return Vec::new();
            }
            if let Some(until) = state.ignore_position_until {
                if Instant::now() < until {
                    return Vec::new();
                }
                state.ignore_position_until = None;
            }
            // at the end of the track the player may already be on the next
            // song; discard the sample and re-sample shortly instead of
            // snapping the view to the last line
            if duration > 0.0 && position >= duration && state.song_loaded() {
                return vec![Effect::QueryPosition {
                    delay: Some(END_OF_TRACK_RECHECK),
                }];
            }
            state.position_secs = position;
            state.duration_secs = duration;
            if state.has_synced && state.follow {
                if let Some(idx) = state.current_line_index() {
                    state.scroll_offset = idx.saturating_sub(state.viewport_height / 2);
                }
            }
            Vec::new()
        }
    }
}

fn handle_lyrics(state: &mut AppState, event: LyricsEvent) -> Vec<Effect> {
    match event {
        LyricsEvent::Loaded { key, song, offset, from_cache } => {
            if state.pending_song_key.as_deref() != Some(&key) {
                return Vec::new(); // stale completion for a song we moved past
            }
            state.pending_song_key = None;
            state.searching = false;
            state.install_song(song, offset);
            state.ignore_position_until = Some(Instant::now() + LOADED_IGNORE_WINDOW);
            if from_cache {
                tracing::debug!("loaded {} from cache", key);
            }
            Vec::new()
        }
        LyricsEvent::Failed { key, message } => {
            if state.pending_song_key.as_deref() != Some(&key) {
                return Vec::new();
            }
            state.pending_song_key = None;
            state.searching = false;
            state.clear_song();
            state.status = message;
            Vec::new()
        }
        LyricsEvent::CachedList { entries } => {
            state.cached_songs = entries;
            state.cached_cursor = 0;
            state.cached_filter.clear();
            state.modal = Modal::CachedSongs;
            Vec::new()
        }
        LyricsEvent::CacheCleared { error } => {
            state.toast = Some(match error {
                None => Toast::success("Cache cleared"),
                Some(e) => Toast::error(format!("Clear cache failed: {e}")),
            });
            Vec::new()
        }
    }
}

pub fn apply(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::Quit => {
            state.should_quit = true;
            Vec::new()
        }
        Action::ToggleAutoDetect => {
            state.auto_detect = !state.auto_detect;
            if state.auto_detect {
                // allow the current song to be picked up again
                state.last_detected_key = None;
                vec![Effect::QueryNowPlaying]
            } else {
                Vec::new()
            }
        }
        Action::ToggleFollow => {
            state.follow = !state.follow;
            Vec::new()
        }
        Action::OffsetIncrease => adjust_offset(state, OFFSET_STEP),
        Action::OffsetDecrease => adjust_offset(state, -OFFSET_STEP),
        Action::ScrollUp => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            Vec::new()
        }
        Action::ScrollDown => {
            state.scroll_offset = (state.scroll_offset + 1).min(max_scroll(state));
            Vec::new()
        }
        Action::GoTop => {
            state.scroll_offset = 0;
            Vec::new()
        }
        Action::GoBottom => {
            state.scroll_offset = max_scroll(state);
            Vec::new()
        }
        Action::OpenSearch => {
            state.modal = Modal::Search;
            state.search_input.clear();
            Vec::new()
        }
        Action::OpenCachedSongs => vec![Effect::ListCachedSongs],
        Action::CloseModal => {
            state.modal = Modal::None;
            Vec::new()
        }
        Action::InputChar(c) => {
            match state.modal {
                Modal::Search => state.search_input.push(c),
                Modal::CachedSongs => {
                    state.cached_filter.push(c);
                    state.cached_cursor = 0;
                }
                Modal::None => {}
            }
            Vec::new()
        }
        Action::Backspace => {
            match state.modal {
                Modal::Search => {
                    state.search_input.pop();
                }
                Modal::CachedSongs => {
                    state.cached_filter.pop();
                    state.cached_cursor = 0;
                }
                Modal::None => {}
            }
            Vec::new()
        }
        Action::SubmitSearch => {
            let query = state.search_input.trim().to_string();
            state.modal = Modal::None;
            if query.is_empty() {
                return Vec::new();
            }
            let key = format!("search:{query}");
            state.pending_song_key = Some(key.clone());
            state.searching = true;
            state.status = format!("Searching for \"{query}\"...");
            vec![Effect::SearchLyrics { key, query }]
        }
        Action::CachedCursorUp => {
            state.cached_cursor = state.cached_cursor.saturating_sub(1);
            Vec::new()
        }
        Action::CachedCursorDown => {
            let len = state.filtered_cached().len();
            if len > 0 && state.cached_cursor < len - 1 {
                state.cached_cursor += 1;
            }
            Vec::new()
        }
        Action::ActivateCachedSong => {
            let Some(entry) = state.filtered_cached().get(state.cached_cursor).cloned().cloned()
            else {
                return Vec::new();
            };
            state.modal = Modal::None;
            let key = song_key(&entry.artist, &entry.title);
            state.pending_song_key = Some(key.clone());
            state.searching = true;
            state.status = format!("Loading {} - {}...", entry.artist, entry.title);
            vec![Effect::LoadCachedSong {
                key,
                artist: entry.artist,
                title: entry.title,
            }]
        }
        Action::ClearCache => vec![Effect::ClearCache],
        Action::Resize => Vec::new(),
    }
}

fn adjust_offset(state: &mut AppState, step: f64) -> Vec<Effect> {
    if !state.has_synced {
        return Vec::new();
    }
    state.offset_secs += step;
    // persist only for songs identified via the player, where the cache key
    // is known to match
    if !state.player_artist.is_empty() && !state.player_title.is_empty() {
        vec![Effect::PersistOffset {
            artist: state.player_artist.clone(),
            title: state.player_title.clone(),
            offset: state.offset_secs,
        }]
    } else {
        Vec::new()
    }
}

fn max_scroll(state: &AppState) -> usize {
    let total = if state.has_synced {
        state.synced_lines.len()
    } else {
        state.lyrics.lines().count()
    };
    total.saturating_sub(1)
}

pub fn song_key(artist: &str, title: &str) -> String {
    format!("{artist} - {title}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::{Line, Song};

    fn synced_song() -> Song {
        Song {
            artist: "Artist".into(),
            title: "Title".into(),
            lyrics: String::new(),
            synced_lines: (0..20)
                .map(|i| Line {
                    timestamp: i as f64 * 5.0,
                    text: format!("line {i}"),
                })
                .collect(),
            has_synced: true,
        }
    }

    fn now_playing(artist: &str, title: &str) -> Event {
        Event::Player(PlayerEvent::NowPlaying {
            artist: artist.into(),
            title: title.into(),
        })
    }

    fn loaded(state: &mut AppState, song: Song, offset: f64) {
        let key = state.pending_song_key.clone().unwrap();
        let effects = update(
            state,
            Event::Lyrics(LyricsEvent::Loaded {
                key,
                song,
                offset,
                from_cache: false,
            }),
        );
        assert!(effects.is_empty());
        state.ignore_position_until = None; // tests drive positions directly
    }

    #[test]
    fn test_song_change_triggers_one_fetch() {
        let mut state = AppState::new();
        let effects = update(&mut state, now_playing("Artist", "Title"));
        assert_eq!(
            effects,
            vec![Effect::FetchLyrics {
                key: "Artist - Title".into(),
                artist: "Artist".into(),
                title: "Title".into(),
            }]
        );
        assert!(state.searching);
        assert!(state.ignore_position_until.is_some());

        // same song reported again: debounced, no second fetch
        let effects = update(&mut state, now_playing("Artist", "Title"));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_auto_detect_off_ignores_player() {
        let mut state = AppState::new();
        state.auto_detect = false;
        let effects = update(&mut state, now_playing("Artist", "Title"));
        assert!(effects.is_empty());
        assert!(!state.searching);
        // the reported song is still remembered for offset persistence
        assert_eq!(state.player_artist, "Artist");
    }

    #[test]
    fn test_stale_completion_dropped() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Old", "Song"));
        update(&mut state, now_playing("New", "Song"));

        // the old fetch completes after the song already changed
        update(
            &mut state,
            Event::Lyrics(LyricsEvent::Loaded {
                key: "Old - Song".into(),
                song: synced_song(),
                offset: 0.0,
                from_cache: false,
            }),
        );
        assert!(state.searching, "stale result must not end the new fetch");
        assert!(!state.has_synced);

        update(
            &mut state,
            Event::Lyrics(LyricsEvent::Loaded {
                key: "New - Song".into(),
                song: synced_song(),
                offset: 0.0,
                from_cache: false,
            }),
        );
        assert!(!state.searching);
        assert!(state.has_synced);
    }

    #[test]
    fn test_failed_fetch_shows_message() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        update(
            &mut state,
            Event::Lyrics(LyricsEvent::Failed {
                key: "Artist - Title".into(),
                message: "all providers failed: no lyrics found".into(),
            }),
        );
        assert!(!state.searching);
        assert!(!state.song_loaded());
        assert!(state.status.contains("all providers failed"));
    }

    #[test]
    fn test_position_ignored_inside_window() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), 0.0);
        state.ignore_position_until = Some(Instant::now() + Duration::from_secs(10));

        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 42.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.position_secs, 0.0);

        state.ignore_position_until = Some(Instant::now() - Duration::from_millis(1));
        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 42.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.position_secs, 42.0);
        assert!(state.ignore_position_until.is_none());
    }

    #[test]
    fn test_position_ignored_while_searching() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 42.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.position_secs, 0.0);
    }

    #[test]
    fn test_follow_centers_current_line() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), 0.0);
        state.viewport_height = 10;

        // line index 10 plays at t=50
        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 50.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.scroll_offset, 10 - 10 / 2);

        // near the top the offset clamps at zero
        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 5.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn test_follow_off_leaves_scroll_alone() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), 0.0);
        state.follow = false;
        state.scroll_offset = 3;
        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 50.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.scroll_offset, 3);
    }

    #[test]
    fn test_end_of_track_schedules_recheck() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), 0.0);
        state.viewport_height = 10;

        update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 50.0,
                duration: 100.0,
            }),
        );
        assert_eq!(state.position_secs, 50.0);
        let scroll_before = state.scroll_offset;

        let effects = update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 100.0,
                duration: 100.0,
            }),
        );
        assert_eq!(
            effects,
            vec![Effect::QueryPosition {
                delay: Some(END_OF_TRACK_RECHECK)
            }]
        );
        // the end-of-track sample is discarded, not applied
        assert_eq!(state.position_secs, 50.0);
        assert_eq!(state.duration_secs, 100.0);
        assert_eq!(state.scroll_offset, scroll_before);

        // unknown duration never triggers the recheck
        let effects = update(
            &mut state,
            Event::Player(PlayerEvent::Position {
                position: 100.0,
                duration: 0.0,
            }),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_position_tick_gated_on_synced() {
        let mut state = AppState::new();
        assert!(update(&mut state, Event::PositionTick).is_empty());

        update(&mut state, now_playing("Artist", "Title"));
        // still fetching: no position queries yet
        assert!(update(&mut state, Event::PositionTick).is_empty());

        loaded(&mut state, synced_song(), 0.0);
        assert_eq!(
            update(&mut state, Event::PositionTick),
            vec![Effect::QueryPosition { delay: None }]
        );
    }

    #[test]
    fn test_detect_tick_gated_on_auto_detect() {
        let mut state = AppState::new();
        assert_eq!(
            update(&mut state, Event::DetectTick),
            vec![Effect::QueryNowPlaying]
        );
        state.auto_detect = false;
        assert!(update(&mut state, Event::DetectTick).is_empty());
    }

    #[test]
    fn test_offset_adjust_persists_for_player_songs() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), 0.0);

        let effects = apply(&mut state, Action::OffsetIncrease);
        assert!((state.offset_secs - 0.1).abs() < 1e-9);
        assert_eq!(
            effects,
            vec![Effect::PersistOffset {
                artist: "Artist".into(),
                title: "Title".into(),
                offset: state.offset_secs,
            }]
        );

        let effects = apply(&mut state, Action::OffsetDecrease);
        assert!(state.offset_secs.abs() < 1e-9);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_offset_not_persisted_without_player_identity() {
        let mut state = AppState::new();
        state.pending_song_key = Some("search:q".into());
        loaded(&mut state, synced_song(), 0.0);
        let effects = apply(&mut state, Action::OffsetIncrease);
        assert!((state.offset_secs - 0.1).abs() < 1e-9);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_offset_noop_for_plain_lyrics() {
        let mut state = AppState::new();
        state.lyrics = "just words".into();
        let effects = apply(&mut state, Action::OffsetIncrease);
        assert!(effects.is_empty());
        assert_eq!(state.offset_secs, 0.0);
    }

    #[test]
    fn test_offset_shifts_highlight() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), 0.0);
        state.position_secs = 5.0;
        assert_eq!(state.current_line_index(), Some(1));
        apply(&mut state, Action::OffsetIncrease);
        assert_eq!(state.current_line_index(), Some(0));
    }

    #[test]
    fn test_cached_offset_applied_on_load() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        loaded(&mut state, synced_song(), -0.5);
        assert!((state.offset_secs + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_search_submit() {
        let mut state = AppState::new();
        apply(&mut state, Action::OpenSearch);
        assert_eq!(state.modal, Modal::Search);
        for c in "Daft Punk - One More Time".chars() {
            apply(&mut state, Action::InputChar(c));
        }
        let effects = apply(&mut state, Action::SubmitSearch);
        assert_eq!(
            effects,
            vec![Effect::SearchLyrics {
                key: "search:Daft Punk - One More Time".into(),
                query: "Daft Punk - One More Time".into(),
            }]
        );
        assert_eq!(state.modal, Modal::None);
        assert!(state.searching);
    }

    #[test]
    fn test_empty_search_is_noop() {
        let mut state = AppState::new();
        apply(&mut state, Action::OpenSearch);
        let effects = apply(&mut state, Action::SubmitSearch);
        assert!(effects.is_empty());
        assert!(!state.searching);
    }

    #[test]
    fn test_cached_songs_picker() {
        let mut state = AppState::new();
        assert_eq!(
            apply(&mut state, Action::OpenCachedSongs),
            vec![Effect::ListCachedSongs]
        );
        update(
            &mut state,
            Event::Lyrics(LyricsEvent::CachedList {
                entries: vec![
                    crate::lyrics::CachedSongEntry {
                        artist: "A".into(),
                        title: "One".into(),
                    },
                    crate::lyrics::CachedSongEntry {
                        artist: "B".into(),
                        title: "Two".into(),
                    },
                ],
            }),
        );
        assert_eq!(state.modal, Modal::CachedSongs);

        apply(&mut state, Action::CachedCursorDown);
        let effects = apply(&mut state, Action::ActivateCachedSong);
        assert_eq!(
            effects,
            vec![Effect::LoadCachedSong {
                key: "B - Two".into(),
                artist: "B".into(),
                title: "Two".into(),
            }]
        );
        assert_eq!(state.modal, Modal::None);
    }

    #[test]
    fn test_toggle_auto_detect_requeries() {
        let mut state = AppState::new();
        update(&mut state, now_playing("Artist", "Title"));
        assert!(apply(&mut state, Action::ToggleAutoDetect).is_empty());
        assert!(!state.auto_detect);

        let effects = apply(&mut state, Action::ToggleAutoDetect);
        assert_eq!(effects, vec![Effect::QueryNowPlaying]);
        // re-enabling forgets the debounce so the current song reloads
        assert!(state.last_detected_key.is_none());
    }
}

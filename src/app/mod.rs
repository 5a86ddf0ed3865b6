pub mod actions;
pub mod events;
pub mod state;
pub mod update;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::Config;
use crate::input;
use crate::lyrics::ai::AiProvider;
use crate::lyrics::cache::SongCache;
use crate::lyrics::genius::GeniusProvider;
use crate::lyrics::lrclib::LrclibProvider;
use crate::lyrics::service::LyricsService;
use crate::player::MprisPlayer;
use crate::tui::{self, TuiTerminal};
use events::{Event, LyricsEvent, PlayerEvent};
use state::AppState;
use update::Effect;

pub struct App {
    cfg: Config,
    state: AppState,
    service: Arc<LyricsService>,
    player: Arc<MprisPlayer>,
    /// Present when AI mode is on; used for free-form query parsing.
    query_parser: Option<Arc<AiProvider>>,
}

impl App {
    pub fn new(cfg: Config) -> Self {
        let (service, query_parser) = build_service(&cfg);
        let mut state = AppState::new();
        state.follow = cfg.ui.follow;
        state.auto_detect = cfg.ui.auto_detect;

        Self {
            cfg,
            state,
            service: Arc::new(service),
            player: Arc::new(MprisPlayer::new()),
            query_parser,
        }
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone());
        spawn_ticker(
            tx.clone(),
            Duration::from_millis(self.cfg.ui.detect_interval_ms),
            || Event::DetectTick,
        );
        spawn_ticker(
            tx.clone(),
            Duration::from_millis(self.cfg.ui.position_interval_ms),
            || Event::PositionTick,
        );

        tui::draw(terminal, &mut self.state)?;

        // pick up whatever is already playing without waiting a full tick
        self.run_effects(vec![Effect::QueryNowPlaying], &tx);

        while let Some(ev) = rx.recv().await {
            let effects = update::update(&mut self.state, ev);
            self.run_effects(effects, &tx);

            if self.state.should_quit {
                break;
            }

            tui::draw(terminal, &mut self.state)?;
        }

        Ok(())
    }

    fn run_effects(&self, effects: Vec<Effect>, tx: &mpsc::Sender<Event>) {
        for effect in effects {
            match effect {
                Effect::QueryNowPlaying => {
                    let player = self.player.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let event = match player.current_song().await {
                            Ok((artist, title)) => PlayerEvent::NowPlaying { artist, title },
                            Err(e) => {
                                debug!("now-playing query failed: {e:#}");
                                PlayerEvent::NothingPlaying
                            }
                        };
                        let _ = tx.send(Event::Player(event)).await;
                    });
                }
                Effect::QueryPosition { delay } => {
                    let player = self.player.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(delay) = delay {
                            tokio::time::sleep(delay).await;
                        }
                        // a failed position read just waits for the next tick
                        if let Ok((position, duration)) = player.position().await {
                            let _ = tx
                                .send(Event::Player(PlayerEvent::Position { position, duration }))
                                .await;
                        }
                    });
                }
                Effect::FetchLyrics { key, artist, title } => {
                    self.spawn_fetch(key, artist, title, tx);
                }
                Effect::SearchLyrics { key, query } => {
                    let service = self.service.clone();
                    let parser = self.query_parser.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let parsed = match &parser {
                            Some(ai) => ai.parse_query(&query).await.map_err(|e| e.to_string()),
                            None => Ok(split_query(&query)),
                        };
                        let event = match parsed {
                            Ok((artist, title)) => {
                                fetch_with_offset(service, key, artist, title).await
                            }
                            Err(message) => LyricsEvent::Failed { key, message },
                        };
                        let _ = tx.send(Event::Lyrics(event)).await;
                    });
                }
                Effect::LoadCachedSong { key, artist, title } => {
                    let service = self.service.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = tokio::task::spawn_blocking(move || {
                            service.load_cached(&artist, &title)
                        })
                        .await;
                        let event = match result {
                            Ok(Ok(cached)) => {
                                let offset = cached.offset;
                                LyricsEvent::Loaded {
                                    key,
                                    song: cached.into_song(),
                                    offset,
                                    from_cache: true,
                                }
                            }
                            Ok(Err(e)) => LyricsEvent::Failed {
                                key,
                                message: e.to_string(),
                            },
                            Err(e) => LyricsEvent::Failed {
                                key,
                                message: format!("cache load task failed: {e}"),
                            },
                        };
                        let _ = tx.send(Event::Lyrics(event)).await;
                    });
                }
                Effect::ListCachedSongs => {
                    let service = self.service.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let entries =
                            tokio::task::spawn_blocking(move || service.list_cached())
                                .await
                                .unwrap_or_default();
                        let _ = tx.send(Event::Lyrics(LyricsEvent::CachedList { entries })).await;
                    });
                }
                Effect::PersistOffset { artist, title, offset } => {
                    // fire and forget; the in-memory offset is already applied
                    let service = self.service.clone();
                    tokio::spawn(async move {
                        let result = tokio::task::spawn_blocking(move || {
                            service.update_offset(&artist, &title, offset)
                        })
                        .await;
                        if let Ok(Err(e)) = result {
                            debug!("offset persist failed: {e}");
                        }
                    });
                }
                Effect::ClearCache => {
                    let service = self.service.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result =
                            tokio::task::spawn_blocking(move || service.clear_cache()).await;
                        let error = match result {
                            Ok(Ok(())) => None,
                            Ok(Err(e)) => Some(e.to_string()),
                            Err(e) => Some(format!("clear cache task failed: {e}")),
                        };
                        let _ = tx.send(Event::Lyrics(LyricsEvent::CacheCleared { error })).await;
                    });
                }
            }
        }
    }

    fn spawn_fetch(&self, key: String, artist: String, title: String, tx: &mpsc::Sender<Event>) {
        let service = self.service.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = fetch_with_offset(service, key, artist, title).await;
            let _ = tx.send(Event::Lyrics(event)).await;
        });
    }
}

/// Cache first so a hit carries its stored offset and provenance, then the
/// provider pipeline.
async fn fetch_with_offset(
    service: Arc<LyricsService>,
    key: String,
    artist: String,
    title: String,
) -> LyricsEvent {
    let cached = {
        let service = service.clone();
        let (artist, title) = (artist.clone(), title.clone());
        tokio::task::spawn_blocking(move || service.load_cached(&artist, &title)).await
    };
    if let Ok(Ok(cached)) = cached {
        let offset = cached.offset;
        return LyricsEvent::Loaded {
            key,
            song: cached.into_song(),
            offset,
            from_cache: true,
        };
    }
    match service.fetch(&artist, &title).await {
        Ok(song) => LyricsEvent::Loaded {
            key,
            song,
            offset: 0.0,
            from_cache: false,
        },
        Err(e) => LyricsEvent::Failed {
            key,
            message: e.to_string(),
        },
    }
}

pub fn build_service(cfg: &Config) -> (LyricsService, Option<Arc<AiProvider>>) {
    let cache = SongCache::new(cfg.paths.cache_dir.clone());
    if cfg.providers.ai.enabled {
        let ai = AiProvider::new(
            cfg.providers.ai.base_url.clone(),
            cfg.providers.ai.model.clone(),
            cfg.providers.ai.api_key.clone(),
        );
        let service = LyricsService::new(Box::new(ai.clone()), Box::new(ai.clone()), cache);
        (service, Some(Arc::new(ai)))
    } else {
        let genius_token = std::env::var("GENIUS_ACCESS_TOKEN")
            .ok()
            .or_else(|| cfg.providers.genius_token.clone());
        let service = LyricsService::new(
            Box::new(LrclibProvider::new()),
            Box::new(GeniusProvider::new(genius_token)),
            cache,
        );
        (service, None)
    }
}

/// Local fallback for manual queries: "Artist - Title", a missing separator
/// means the whole query is the title.
fn split_query(query: &str) -> (String, String) {
    match query.split_once(" - ") {
        Some((artist, title)) => (artist.trim().to_string(), title.trim().to_string()),
        None => (String::new(), query.trim().to_string()),
    }
}

fn spawn_ticker(tx: mpsc::Sender<Event>, period: Duration, make: fn() -> Event) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(make()).await.is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::CachedSong;

    #[tokio::test]
    async fn test_fetch_with_offset_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SongCache::new(dir.path());
        cache
            .save(&CachedSong {
                artist: "Air".into(),
                title: "La Femme d'Argent".into(),
                lyrics: "instrumental".into(),
                synced_lines: Vec::new(),
                has_synced: false,
                offset: 0.4,
            })
            .unwrap();

        let mut cfg = Config::default();
        cfg.paths.cache_dir = dir.path().to_path_buf();
        let (service, _) = build_service(&cfg);

        // a cache hit never reaches a provider, so no network is involved
        let event = fetch_with_offset(
            Arc::new(service),
            "Air - La Femme d'Argent".into(),
            "Air".into(),
            "La Femme d'Argent".into(),
        )
        .await;
        match event {
            LyricsEvent::Loaded {
                song,
                offset,
                from_cache,
                ..
            } => {
                assert_eq!(song.lyrics, "instrumental");
                assert!((offset - 0.4).abs() < 1e-9);
                assert!(from_cache);
            }
            other => panic!("expected a loaded event, got {other:?}"),
        }
    }

    #[test]
    fn test_split_query() {
        assert_eq!(
            split_query("Daft Punk - One More Time"),
            ("Daft Punk".to_string(), "One More Time".to_string())
        );
        assert_eq!(
            split_query("Bohemian Rhapsody"),
            (String::new(), "Bohemian Rhapsody".to_string())
        );
        assert_eq!(
            split_query("  ELO - Mr. Blue Sky  "),
            ("ELO".to_string(), "Mr. Blue Sky".to_string())
        );
    }
}

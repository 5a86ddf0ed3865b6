use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::{AppState, Modal};
use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || loop {
        if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
            match event::read() {
                Ok(CtEvent::Key(k)) => {
                    if k.kind == KeyEventKind::Press
                        && tx.blocking_send(Event::Input(InputEvent::Key(k))).is_err()
                    {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.blocking_send(Event::Input(InputEvent::Resize)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => {}
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Key(k) => match state.modal {
            Modal::Search => handle_search_modal(k),
            Modal::CachedSongs => handle_cached_songs_modal(k),
            Modal::None => handle_main_view(k),
        },
    }
}

fn handle_main_view(k: crossterm::event::KeyEvent) -> Option<Action> {
    match k.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),

        // Scrolling - vim style
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::Char('g') => Some(Action::GoTop),
        KeyCode::Char('G') => Some(Action::GoBottom),

        // Modes
        KeyCode::Tab => Some(Action::ToggleAutoDetect),
        KeyCode::Char('f') => Some(Action::ToggleFollow),

        // Timing correction
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::OffsetIncrease),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::OffsetDecrease),

        // Modals
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('l') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::OpenCachedSongs)
        }

        KeyCode::Char('C') => Some(Action::ClearCache),

        _ => None,
    }
}

fn handle_search_modal(k: crossterm::event::KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc => Some(Action::CloseModal),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Enter => Some(Action::SubmitSearch),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        _ => None,
    }
}

fn handle_cached_songs_modal(k: crossterm::event::KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc => Some(Action::CloseModal),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Enter => Some(Action::ActivateCachedSong),
        KeyCode::Up => Some(Action::CachedCursorUp),
        KeyCode::Down => Some(Action::CachedCursorDown),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::from(code))
    }

    #[test]
    fn test_main_view_keys() {
        let state = AppState::new();
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Tab)),
            Some(Action::ToggleAutoDetect)
        );
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Char('+'))),
            Some(Action::OffsetIncrease)
        );
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Char('/'))),
            Some(Action::OpenSearch)
        );
    }

    #[test]
    fn test_modal_captures_typing() {
        let mut state = AppState::new();
        state.modal = Modal::Search;
        // 'q' types into the input instead of quitting
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Char('q'))),
            Some(Action::InputChar('q'))
        );
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Esc)),
            Some(Action::CloseModal)
        );
    }

    #[test]
    fn test_cached_modal_navigation() {
        let mut state = AppState::new();
        state.modal = Modal::CachedSongs;
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Down)),
            Some(Action::CachedCursorDown)
        );
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Enter)),
            Some(Action::ActivateCachedSong)
        );
    }
}

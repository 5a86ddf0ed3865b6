//! Root layout: info column on the left, lyrics panel on the right,
//! one help line at the bottom, modals on top of everything.

use crate::app::state::{AppState, Modal};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use super::{help, info, lyrics, modals};

pub fn render(frame: &mut Frame, state: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(rows[0]);

    info::render(frame, state, cols[0]);
    lyrics::render(frame, state, cols[1]);
    help::render(frame, state, rows[1]);

    match state.modal {
        Modal::None => {}
        Modal::Search => modals::render_search(frame, state),
        Modal::CachedSongs => modals::render_cached_songs(frame, state),
    }
}

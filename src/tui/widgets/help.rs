//! Single help line at the bottom of the screen.

use crate::app::state::{AppState, Modal};
use crate::tui::theme::get_theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let binds: &[(&str, &str)] = match state.modal {
        Modal::None => &[
            ("q", "quit"),
            ("/", "search"),
            ("Tab", "auto-detect"),
            ("f", "follow"),
            ("+/-", "offset"),
            ("j/k", "scroll"),
            ("^L", "cached"),
            ("C", "clear cache"),
        ],
        Modal::Search => &[("Enter", "search"), ("Esc", "close")],
        Modal::CachedSongs => &[
            ("Enter", "load"),
            ("Up/Down", "move"),
            ("type", "filter"),
            ("Esc", "close"),
        ],
    };

    let theme = get_theme();
    let mut spans = vec![Span::raw(" ")];
    for (key, desc) in binds {
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {desc}  "),
            Style::default().fg(theme.palette.fg_secondary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

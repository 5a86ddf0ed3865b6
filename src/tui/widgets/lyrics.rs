//! Lyrics panel: synced lines with the current one highlighted, or plain
//! text, or a status message while fetching / after a failure.

use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();

    let title = if state.song_loaded() {
        format!(" {} - {} ", state.artist, state.title)
    } else {
        " Lyrics ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(Style::default().fg(theme.palette.accent));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // the follow-mode centering in the reducer needs the real height
    state.viewport_height = inner.height as usize;

    if state.searching {
        render_message(frame, inner, &state.status, theme.palette.fg_secondary);
        return;
    }
    if !state.song_loaded() {
        let msg = if state.status.is_empty() {
            "Nothing playing. Press / to search, Tab to toggle auto-detect."
        } else {
            state.status.as_str()
        };
        render_message(frame, inner, msg, theme.palette.fg_secondary);
        return;
    }

    let lines: Vec<Line> = if state.has_synced {
        // with follow off the view is inert: no line is singled out
        let current = if state.follow {
            state.current_line_index()
        } else {
            None
        };
        state
            .synced_lines
            .iter()
            .enumerate()
            .skip(state.scroll_offset)
            .take(inner.height as usize)
            .map(|(i, l)| {
                let style = match current {
                    Some(c) if i == c => Style::default()
                        .fg(theme.palette.current_line)
                        .add_modifier(Modifier::BOLD),
                    Some(c) if i < c => Style::default().fg(theme.palette.fg_dim),
                    _ => Style::default().fg(theme.palette.fg_secondary),
                };
                Line::from(Span::styled(l.text.clone(), style))
            })
            .collect()
    } else {
        state
            .lyrics
            .lines()
            .skip(state.scroll_offset)
            .take(inner.height as usize)
            .map(|l| {
                Line::from(Span::styled(
                    l.to_string(),
                    Style::default().fg(theme.palette.fg_primary),
                ))
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: ratatui::style::Color) {
    let mut lines = vec![Line::default(); (area.height / 2).saturating_sub(1) as usize];
    lines.push(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(color),
    )));
    frame.render_widget(
        Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
        area,
    );
}

//! Search and cached-songs modals, rendered centered over the main view.

use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render_search(frame: &mut Frame, state: &AppState) {
    let theme = get_theme();
    let area = centered_rect(frame.area(), 60, 3);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent))
        .title(" Search lyrics ")
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = Line::from(vec![
        Span::styled(
            format!(" {}", state.search_input),
            Style::default().fg(theme.palette.fg_primary),
        ),
        Span::styled("█", Style::default().fg(theme.palette.accent)),
    ]);
    frame.render_widget(Paragraph::new(input), inner);
}

pub fn render_cached_songs(frame: &mut Frame, state: &AppState) {
    let theme = get_theme();
    let area = centered_rect(frame.area(), 64, 18);
    frame.render_widget(Clear, area);

    let filtered = state.filtered_cached();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent))
        .title(format!(" Cached songs ({}) ", filtered.len()))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let filter = Line::from(vec![
        Span::styled(" filter: ", Style::default().fg(theme.palette.fg_secondary)),
        Span::styled(
            state.cached_filter.clone(),
            Style::default().fg(theme.palette.fg_primary),
        ),
        Span::styled("█", Style::default().fg(theme.palette.fg_dim)),
    ]);
    frame.render_widget(Paragraph::new(filter), rows[0]);

    if filtered.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " no cached songs",
                Style::default().fg(theme.palette.fg_dim),
            ))),
            rows[1],
        );
        return;
    }

    // keep the cursor inside the visible window
    let height = rows[1].height as usize;
    let top = state
        .cached_cursor
        .saturating_sub(height.saturating_sub(1))
        .min(filtered.len().saturating_sub(height));

    let lines: Vec<Line> = filtered
        .iter()
        .enumerate()
        .skip(top)
        .take(height)
        .map(|(i, entry)| {
            let text = format!(" {} - {}", entry.artist, entry.title);
            let style = if i == state.cached_cursor {
                Style::default()
                    .fg(theme.palette.fg_primary)
                    .bg(theme.palette.bg_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.palette.fg_secondary)
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

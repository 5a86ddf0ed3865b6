//! Left info column: detected song, playback clock, mode flags, offset.

use crate::app::state::{AppState, ToastKind};
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" lyra ")
        .title_style(
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    let content_width = padded.width as usize;
    let dim = Style::default().fg(theme.palette.fg_secondary);
    let bright = Style::default().fg(theme.palette.fg_primary);

    let player_line = if state.player_artist.is_empty() {
        Line::from(Span::styled("No player detected", dim))
    } else {
        Line::from(Span::styled(
            truncate_str(
                &format!("{} - {}", state.player_artist, state.player_title),
                content_width,
            ),
            bright,
        ))
    };

    let ratio = if state.duration_secs > 0.0 {
        (state.position_secs / state.duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let clock = format!(
        "{} / {}",
        format_time(state.position_secs),
        format_time(state.duration_secs)
    );

    let kind = if !state.song_loaded() {
        "-"
    } else if state.has_synced {
        "synced"
    } else {
        "plain"
    };

    let mut lines = vec![
        Line::from(Span::styled("Player", dim)),
        player_line,
        Line::default(),
        Line::from(Span::styled(clock, bright)),
        Line::from(Span::styled(
            progress_bar(content_width, ratio),
            Style::default().fg(theme.palette.accent),
        )),
        Line::default(),
        flag_line("auto-detect", state.auto_detect, &theme),
        flag_line("follow", state.follow, &theme),
        Line::from(vec![
            Span::styled("lyrics      ", dim),
            Span::styled(kind, bright),
        ]),
        Line::from(vec![
            Span::styled("offset      ", dim),
            Span::styled(format!("{:+.1}s", state.offset_secs), bright),
        ]),
    ];

    if let Some(toast) = &state.toast {
        let color = match toast.kind {
            ToastKind::Success => theme.palette.success,
            ToastKind::Error => theme.palette.error,
        };
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            truncate_str(&toast.message, content_width),
            Style::default().fg(color),
        )));
    }

    frame.render_widget(Paragraph::new(lines), padded);
}

fn flag_line(name: &str, on: bool, theme: &crate::tui::theme::Theme) -> Line<'static> {
    let value_style = if on {
        Style::default().fg(theme.palette.success)
    } else {
        Style::default().fg(theme.palette.fg_dim)
    };
    Line::from(vec![
        Span::styled(
            format!("{name:<12}"),
            Style::default().fg(theme.palette.fg_secondary),
        ),
        Span::styled(if on { "on" } else { "off" }, value_style),
    ])
}

fn format_time(secs: f64) -> String {
    let secs = secs.max(0.0);
    format!("{:02}:{:02}", (secs / 60.0) as u32, (secs % 60.0) as u32)
}

fn progress_bar(width: usize, ratio: f64) -> String {
    if width < 3 {
        return String::new();
    }
    let filled = ((width as f64) * ratio).round() as usize;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push('━');
    }
    for _ in filled..width {
        bar.push('─');
    }
    bar
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

mod details;
mod genres;
mod grid;
mod help;
mod my_list;
mod player;
mod popup;
mod rows;
mod search;

use crate::app::{App, Content, NAV_TABS};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Brand accent, #e50914.
pub const ACCENT: Color = Color::Rgb(229, 9, 20);

/// Top-level render dispatch: nav chrome, the active view, then overlays.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let content_area = if app.hide_nav {
        area
    } else {
        // Layout: nav(2) + content(min) + status(1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);
        render_nav(app, frame, chunks[0]);
        render_status(app, frame, chunks[2]);
        chunks[1]
    };

    match &app.content {
        Content::Loading => render_loading(frame, content_area),
        Content::Home(state) => rows::render_home(app, state, frame, content_area),
        Content::Rows(state) => rows::render_rows(app, state, frame, content_area),
        Content::MyList(state) => my_list::render(state, frame, content_area),
        Content::Grid(state) => grid::render(app, state, frame, content_area),
        Content::Genres(state) => genres::render(state, frame, content_area),
        Content::Search(state) => search::render(app, state, frame, content_area),
        Content::Details(state) => details::render(state, frame, content_area),
        Content::Player(state) => player::render(state, frame, content_area),
        Content::UnknownCategory { title } => render_unknown(title, frame, content_area),
    }

    if let Some(anchor) = app.popup.visible() {
        popup::render(anchor, frame, content_area);
    }
    if app.show_help {
        help::render(frame);
    }
}

// ── Chrome ──

fn render_nav(app: &App, frame: &mut Frame, area: Rect) {
    let active = app.history.current().nav_tab();
    let mut spans = vec![
        Span::styled(
            " MARQUEE ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    for (index, tab) in NAV_TABS.iter().enumerate() {
        let style = if active == Some(index) {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[{}] {tab}", index + 1), style));
        spans.push(Span::raw("  "));
    }
    if app.history.can_back() {
        spans.push(Span::styled("‹", Style::default().fg(Color::Gray)));
    }
    if app.history.can_forward() {
        spans.push(Span::styled("›", Style::default().fg(Color::Gray)));
    }
    let nav = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(nav, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = if app.status_msg.is_empty() {
        Line::from(vec![
            Span::styled(
                " 1-6",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Views  "),
            Span::styled(
                "Bksp",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Back  "),
            Span::styled(
                "Enter",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Open  "),
            Span::styled(
                "?",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Help  "),
            Span::styled(
                "q",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Quit"),
        ])
    } else {
        Line::from(Span::styled(
            format!(" {}", app.status_msg),
            Style::default().fg(Color::Yellow),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let text = Paragraph::new("Loading…")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, centered_rect(40, 20, area));
}

fn render_unknown(title: &str, frame: &mut Frame, area: Rect) {
    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Unknown category."),
        Line::from(Span::styled(
            "Press Backspace to go back.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(body, centered_rect(60, 40, area));
}

/// Create a centered rectangle using percentage of parent area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            break;
        }
        width += w;
        result.push(c);
    }
    result.push('…');
    result
}

use super::{ACCENT, centered_rect};
use crate::app::PlayerState;
use crate::tmdb::MediaKind;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(state: &PlayerState, frame: &mut Frame, area: Rect) {
    let card = centered_rect(80, 60, area);

    let what = match state.kind {
        MediaKind::Movie => format!("movie {}", state.id),
        MediaKind::Tv => format!("tv {} S{:02}E{:02}", state.id, state.season, state.episode),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Now playing: {what}"),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            state.embed_url.clone(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    if state.loader_visible() {
        lines.push(Line::from(Span::styled(
            "Initializing stream…",
            Style::default().fg(Color::Yellow),
        )));
    } else if state.launched {
        lines.push(Line::from(Span::styled(
            "Opened in browser.",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Press o to open the stream in your browser.",
            Style::default().fg(Color::Gray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" Player ");
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        card,
    );

    // Controls fade out after a few idle seconds, like a real player chrome.
    if state.overlay.visible() {
        let controls = Rect {
            x: area.x,
            y: area.bottom().saturating_sub(1),
            width: area.width,
            height: 1,
        };
        let line = Line::from(vec![
            Span::styled(
                " o",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Open in browser  "),
            Span::styled(
                "Bksp/Esc",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Back  "),
            Span::styled(
                "any key",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Show controls"),
        ]);
        frame.render_widget(Paragraph::new(line), controls);
    }
}

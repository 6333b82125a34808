use super::truncate_str;
use crate::popup::PopupAnchor;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const WIDTH: u16 = 44;
const HEIGHT: u16 = 9;

/// Preview card shown after dwelling on a tile. Pinned to the lower-right
/// corner of the content region so it never covers the selection itself.
pub fn render(anchor: &PopupAnchor, frame: &mut Frame, area: Rect) {
    let width = WIDTH.min(area.width);
    let height = HEIGHT.min(area.height);
    if width < 10 || height < 4 {
        return;
    }
    let card = Rect {
        x: area.right() - width,
        y: area.bottom() - height,
        width,
        height,
    };
    frame.render_widget(Clear, card);

    let content = &anchor.content;
    let overview = if content.overview.is_empty() {
        "No overview available.".to_string()
    } else {
        content.overview.clone()
    };
    let poster = if content.poster_path.is_empty() {
        "—".to_string()
    } else {
        crate::tmdb::poster_url(&content.poster_path)
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("[{}] ", content.kind.label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                truncate_str(&content.title, (width as usize).saturating_sub(12)),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            poster,
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from(Span::styled(overview, Style::default().fg(Color::Gray))),
    ];

    let body = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray))
            .title_bottom(
                Line::from(" Enter Details  p Play ").style(Style::default().fg(Color::DarkGray)),
            ),
    );
    frame.render_widget(body, card);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::{PopupAnchor, PopupContent};
    use crate::tmdb::MediaKind;
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.cell((x, y)).map_or(" ", |cell| cell.symbol()));
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn card_shows_poster_url_and_play_hint() {
        let anchor = PopupAnchor {
            row: 0,
            tile: 0,
            content: PopupContent {
                kind: MediaKind::Movie,
                id: 949,
                title: "Heat".to_string(),
                overview: "A crew of career criminals.".to_string(),
                poster_path: "/heat.jpg".to_string(),
            },
        };
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&anchor, frame, area);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("[MOVIE] Heat"));
        assert!(text.contains("https://image.tmdb.org/t/p/w500/heat.jpg"));
        assert!(text.contains("p Play"));
    }

    #[test]
    fn missing_poster_renders_a_placeholder() {
        let anchor = PopupAnchor {
            row: 0,
            tile: 0,
            content: PopupContent {
                kind: MediaKind::Tv,
                id: 1,
                title: "Untitled".to_string(),
                overview: String::new(),
                poster_path: String::new(),
            },
        };
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&anchor, frame, area);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(!text.contains("image.tmdb.org"));
        assert!(text.contains("No overview available."));
    }
}

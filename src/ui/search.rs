use super::rows::render_tile;
use crate::app::{App, SearchFocus, SearchResults, SearchState, TILE_HEIGHT, TILE_WIDTH};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(app: &App, state: &SearchState, frame: &mut Frame, area: Rect) {
    // Layout: query(3) + filters(1) + results(min)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(TILE_HEIGHT),
        ])
        .split(area);

    render_query_bar(state, frame, chunks[0]);
    render_filter_bar(state, frame, chunks[1]);
    render_results(app, state, frame, chunks[2]);
}

fn render_query_bar(state: &SearchState, frame: &mut Frame, area: Rect) {
    let editing = state.focus == SearchFocus::Query;
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label = if editing {
        " Search (Enter to submit, Esc to cancel): "
    } else {
        " Search (/): "
    };
    let bar = Paragraph::new(format!("{label}{}", state.input))
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(bar, area);

    if editing {
        let cursor_x = area.x + label.len() as u16 + state.input.chars().count() as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_filter_bar(state: &SearchState, frame: &mut Frame, area: Rect) {
    let year_editing = state.focus == SearchFocus::Year;
    let year = if state.year_filter.is_empty() && !year_editing {
        "any".to_string()
    } else {
        state.year_filter.clone()
    };
    let year_style = if year_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let prefix = format!(" Type [{}] (t)   Year [", state.kind_filter.label());
    let line = Line::from(vec![
        Span::styled(" Type ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("[{}]", state.kind_filter.label()),
            Style::default().fg(Color::White),
        ),
        Span::styled(" (t)   Year ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("[{year}]"), year_style),
        Span::styled(" (y)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if year_editing {
        let cursor_x =
            area.x + prefix.chars().count() as u16 + state.year_filter.chars().count() as u16;
        frame.set_cursor_position((cursor_x, area.y));
    }
}

fn render_results(app: &App, state: &SearchState, frame: &mut Frame, area: Rect) {
    let heading = match &state.results {
        SearchResults::Loading => Some("Searching…"),
        SearchResults::Unavailable => Some("Search unavailable. Press Enter to retry."),
        SearchResults::Suggestions(_) => Some("Trending now"),
        SearchResults::Results(_) => None,
    };

    let mut y = area.y;
    if let Some(text) = heading {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {text}"),
                Style::default().fg(Color::DarkGray),
            )),
            Rect { y, height: 1, ..area },
        );
        y += 1;
    } else {
        let count = state.filtered.len();
        let label = if count == 1 { "result" } else { "results" };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {count} {label} for \"{}\"", state.committed),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Rect { y, height: 1, ..area },
        );
        y += 1;
    }

    let items = state.visible_items();
    if items.is_empty() {
        if matches!(&state.results, SearchResults::Results(_) | SearchResults::Suggestions(_)) {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " No titles match.",
                    Style::default().fg(Color::DarkGray),
                )),
                Rect { y, height: 1, ..area },
            );
        }
        return;
    }

    let strip = Rect {
        x: area.x,
        y,
        width: area.width,
        height: TILE_HEIGHT.min(area.bottom().saturating_sub(y)),
    };
    if strip.height == 0 {
        return;
    }
    let visible = app.visible_tiles();
    for (slot, item) in items.iter().skip(state.scroll).take(visible).enumerate() {
        let tile_area = Rect {
            x: strip.x + (slot as u16) * TILE_WIDTH,
            y: strip.y,
            width: TILE_WIDTH.saturating_sub(1),
            height: strip.height,
        };
        if tile_area.right() > strip.right() {
            break;
        }
        render_tile(item, state.scroll + slot == state.selected, frame, tile_area);
    }
}

use super::rows::render_tile;
use crate::app::{App, GridState, TILE_HEIGHT, TILE_WIDTH};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub fn render(app: &App, state: &GridState, frame: &mut Frame, area: Rect) {
    // Layout: heading(1) + grid(min) + footer(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(TILE_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    let heading = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {}", state.title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{} loaded]", state.items.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(heading, chunks[0]);

    let grid_area = chunks[1];
    let cols = app.visible_tiles();
    let tile_rows = (grid_area.height / TILE_HEIGHT).max(1) as usize;
    let sel_row = state.selected / cols;
    let first_row = if sel_row >= tile_rows {
        sel_row + 1 - tile_rows
    } else {
        0
    };

    for (index, item) in state.items.iter().enumerate() {
        let row = index / cols;
        if row < first_row || row >= first_row + tile_rows {
            continue;
        }
        let col = index % cols;
        let tile_area = Rect {
            x: grid_area.x + (col as u16) * TILE_WIDTH,
            y: grid_area.y + ((row - first_row) as u16) * TILE_HEIGHT,
            width: TILE_WIDTH.saturating_sub(1),
            height: TILE_HEIGHT,
        };
        if tile_area.right() > grid_area.right() || tile_area.bottom() > grid_area.bottom() {
            continue;
        }
        render_tile(item, index == state.selected, frame, tile_area);
    }

    let cursor = state.paginator.cursor();

    if state.items.is_empty() && !cursor.failed {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Loading…",
                Style::default().fg(Color::DarkGray),
            )),
            grid_area,
        );
    }

    let footer = if cursor.failed {
        Span::styled(
            " Couldn't load more titles. Keep browsing to retry.",
            Style::default().fg(Color::Yellow),
        )
    } else if cursor.loading {
        Span::styled(" Loading more…", Style::default().fg(Color::DarkGray))
    } else if state.paginator.exhausted() && !state.items.is_empty() {
        Span::styled(" End of results.", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!(" Page {}/{}", cursor.current_page, cursor.total_pages),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(footer)), chunks[2]);
}

use super::{ACCENT, truncate_str};
use crate::app::{App, HeroSlot, HomeState, ROW_HEIGHT, Row, RowItems, RowsState, RowsView, TILE_HEIGHT, TILE_WIDTH};
use crate::tmdb::CatalogItem;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render_home(app: &App, state: &HomeState, frame: &mut Frame, area: Rect) {
    // Layout: hero(6) + rows(min)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(ROW_HEIGHT)])
        .split(area);
    render_hero(&state.hero, frame, chunks[0]);
    render_row_stack(app, &state.rows, frame, chunks[1]);
}

pub fn render_rows(app: &App, state: &RowsState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(ROW_HEIGHT)])
        .split(area);
    let heading = Paragraph::new(Span::styled(
        format!(" {}", state.heading),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(heading, chunks[0]);
    render_row_stack(app, &state.rows, frame, chunks[1]);
}

fn render_hero(hero: &HeroSlot, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" Trending This Week ");
    let inner_width = area.width.saturating_sub(4) as usize;
    let lines = match hero {
        HeroSlot::Loading => vec![Line::from(Span::styled(
            "Loading…",
            Style::default().fg(Color::DarkGray),
        ))],
        HeroSlot::Unavailable => vec![Line::from(Span::styled(
            "Content unavailable.",
            Style::default().fg(Color::DarkGray),
        ))],
        HeroSlot::Ready(item) => {
            let mut lines = vec![Line::from(Span::styled(
                truncate_str(&item.title, inner_width),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))];
            let meta = match item.year() {
                Some(year) => format!("{year}  ★ {:.1}", item.vote_average),
                None => format!("★ {:.1}", item.vote_average),
            };
            lines.push(Line::from(Span::styled(
                meta,
                Style::default().fg(Color::Yellow),
            )));
            lines.push(Line::from(truncate_str(&item.overview, inner_width)));
            lines.push(Line::from(Span::styled(
                "D Details   P Play   A My List",
                Style::default().fg(Color::DarkGray),
            )));
            lines
        }
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_row_stack(app: &App, rows: &RowsView, frame: &mut Frame, area: Rect) {
    let visible_rows = (area.height / ROW_HEIGHT).max(1) as usize;
    let first = if rows.row_sel >= visible_rows {
        rows.row_sel + 1 - visible_rows
    } else {
        0
    };
    for (offset, row) in rows.rows.iter().skip(first).take(visible_rows).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + (offset as u16) * ROW_HEIGHT,
            width: area.width,
            height: ROW_HEIGHT.min(area.height.saturating_sub((offset as u16) * ROW_HEIGHT)),
        };
        if row_area.height == 0 {
            continue;
        }
        let row_index = first + offset;
        render_row(app, row, row_index == rows.row_sel, rows.tile_sel, frame, row_area);
    }
}

fn render_row(
    app: &App,
    row: &Row,
    active: bool,
    tile_sel: usize,
    frame: &mut Frame,
    area: Rect,
) {
    let title_style = if active {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut title_spans = vec![Span::styled(format!(" {}", row.title), title_style)];
    if active {
        title_spans.push(Span::styled(
            "  (v: view all)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(title_spans)),
        Rect { height: 1, ..area },
    );

    let tiles_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    if tiles_area.height == 0 {
        return;
    }

    match &row.items {
        RowItems::Loading => {
            frame.render_widget(
                Paragraph::new(Span::styled(" Loading…", Style::default().fg(Color::DarkGray))),
                tiles_area,
            );
        }
        RowItems::Unavailable => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " Content unavailable.",
                    Style::default().fg(Color::DarkGray),
                )),
                tiles_area,
            );
        }
        RowItems::Ready(items) if items.is_empty() => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " Nothing here.",
                    Style::default().fg(Color::DarkGray),
                )),
                tiles_area,
            );
        }
        RowItems::Ready(items) => {
            let visible = app.visible_tiles();
            for (slot, item) in items.iter().skip(row.scroll).take(visible).enumerate() {
                let tile_area = Rect {
                    x: tiles_area.x + (slot as u16) * TILE_WIDTH,
                    y: tiles_area.y,
                    width: TILE_WIDTH.saturating_sub(1),
                    height: TILE_HEIGHT.min(tiles_area.height),
                };
                if tile_area.right() > tiles_area.right() {
                    break;
                }
                let selected = active && row.scroll + slot == tile_sel;
                render_tile(item, selected, frame, tile_area);
            }
        }
    }
}

/// One catalog tile, shared by the row stack, the view-all grid, and the
/// search results strip.
pub fn render_tile(item: &CatalogItem, selected: bool, frame: &mut Frame, area: Rect) {
    let border = if selected {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner_width = area.width.saturating_sub(2) as usize;
    let title_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let meta = match item.year() {
        Some(year) => format!("{year} ★ {:.1}", item.vote_average),
        None => format!("★ {:.1}", item.vote_average),
    };
    let lines = vec![
        Line::from(Span::styled(truncate_str(&item.title, inner_width), title_style)),
        Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

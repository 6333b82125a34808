use super::ACCENT;
use crate::app::{GenreSlot, GenresState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

pub fn render(state: &GenresState, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_column(state, 0, " Movie Genres ", frame, columns[0]);
    render_column(state, 1, " TV Genres ", frame, columns[1]);
}

fn render_column(state: &GenresState, column: usize, title: &str, frame: &mut Frame, area: Rect) {
    let active = state.column == column;
    let border = if active {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
        .title_bottom(
            Line::from(" Enter: browse genre ").style(Style::default().fg(Color::DarkGray)),
        );

    match state.column_slot(column) {
        GenreSlot::Loading => {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading…", Style::default().fg(Color::DarkGray)))
                    .block(block),
                area,
            );
        }
        GenreSlot::Unavailable => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Content unavailable.",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block),
                area,
            );
        }
        GenreSlot::Ready(genres) => {
            let items: Vec<ListItem> = genres
                .iter()
                .map(|genre| ListItem::new(Line::from(genre.name.clone())))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▸ ");
            let mut list_state = ListState::default();
            if active {
                list_state.select(Some(state.selected[column]));
            }
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

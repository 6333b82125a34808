use super::truncate_str;
use crate::app::MyListState;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

pub fn render(state: &MyListState, frame: &mut Frame, area: Rect) {
    if state.items.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Your list is empty.",
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                "Press a on any title to save it here.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" My List "),
        );
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let items: Vec<ListItem> = state
        .items
        .iter()
        .map(|item| {
            let line = Line::from(vec![
                Span::styled(
                    format!("[{}] ", item.kind.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{}  ", item.title),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    truncate_str(&item.overview, width.saturating_sub(item.title.len() + 14)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" My List [{}] ", state.items.len()))
                .title_bottom(
                    Line::from(" Enter Details  p Play  x Remove ")
                        .style(Style::default().fg(Color::DarkGray))
                        .alignment(Alignment::Right),
                ),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

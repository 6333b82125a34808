use super::{ACCENT, rows::render_tile, truncate_str};
use crate::app::{DetailsFocus, DetailsReady, DetailsSlot, DetailsState, EpisodesSlot, TILE_HEIGHT, TILE_WIDTH};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

pub fn render(state: &DetailsState, frame: &mut Frame, area: Rect) {
    match &state.slot {
        DetailsSlot::Loading => {
            frame.render_widget(
                Paragraph::new("Loading…")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray)),
                super::centered_rect(40, 20, area),
            );
        }
        DetailsSlot::Failed => {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from("Content unavailable."),
                    Line::from(Span::styled(
                        "Press Backspace to go back.",
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
                .alignment(Alignment::Center),
                super::centered_rect(40, 20, area),
            );
        }
        DetailsSlot::Ready(ready) => render_ready(ready, frame, area),
    }
}

fn render_ready(ready: &DetailsReady, frame: &mut Frame, area: Rect) {
    let has_episodes = !matches!(ready.episodes, EpisodesSlot::NotApplicable);
    // Layout: header(6) + overview(4) + actions(1) + lower(min)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(TILE_HEIGHT + 2),
        ])
        .split(area);

    render_header(ready, frame, chunks[0]);

    let overview = Paragraph::new(ready.details.overview.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(overview, inset(chunks[1]));

    render_actions(ready, frame, chunks[2]);

    if has_episodes {
        let lower = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(TILE_HEIGHT + 2)])
            .split(chunks[3]);
        render_episodes(ready, frame, lower[0]);
        render_similar(ready, frame, lower[1]);
    } else {
        render_similar(ready, frame, chunks[3]);
    }
}

fn render_header(ready: &DetailsReady, frame: &mut Frame, area: Rect) {
    let details = &ready.details;
    let year = details
        .release_date
        .as_deref()
        .and_then(|d| d.get(0..4))
        .unwrap_or("—");
    let poster = details
        .poster_path
        .as_deref()
        .map(crate::tmdb::poster_url)
        .unwrap_or_else(|| "—".to_string());
    let lines = vec![
        Line::from(Span::styled(
            details.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(year.to_string(), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("   ★ {:.1}", details.vote_average),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![
            Span::styled("Cast: ", Style::default().fg(Color::DarkGray)),
            Span::styled(ready.cast.clone(), Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![
            Span::styled("Poster: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                poster,
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_actions(ready: &DetailsReady, frame: &mut Frame, area: Rect) {
    let focused = ready.focus == DetailsFocus::Actions;
    let key_style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let toggle = if ready.in_list {
        "a Remove from My List"
    } else {
        "a Add to My List"
    };
    let line = Line::from(vec![
        Span::styled(" ▶ p Play", key_style),
        Span::raw("   "),
        Span::styled(toggle, key_style),
        Span::styled(
            "   Tab: switch panel",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_episodes(ready: &DetailsReady, frame: &mut Frame, area: Rect) {
    let focused = ready.focus == DetailsFocus::Episodes;
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let season_name = ready
        .seasons
        .get(ready.season_sel)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "Season".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(
            " {} ({}/{}) ",
            season_name,
            ready.season_sel + 1,
            ready.seasons.len()
        ))
        .title_bottom(
            Line::from(" [ ] switch season  Enter play ")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Right),
        );

    match &ready.episodes {
        EpisodesSlot::NotApplicable => {}
        EpisodesSlot::Loading => {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading…", Style::default().fg(Color::DarkGray)))
                    .block(block),
                area,
            );
        }
        EpisodesSlot::Failed => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Episodes unavailable.",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block),
                area,
            );
        }
        EpisodesSlot::Ready(episodes) => {
            let width = area.width as usize;
            let items: Vec<ListItem> = episodes
                .iter()
                .map(|episode| {
                    let runtime = episode
                        .runtime
                        .map(|m| format!(" {m}m"))
                        .unwrap_or_default();
                    let line = Line::from(vec![
                        Span::styled(
                            format!("E{:02} ", episode.episode_number),
                            Style::default().fg(Color::Cyan),
                        ),
                        Span::styled(
                            truncate_str(&episode.name, width.saturating_sub(14)),
                            Style::default().fg(Color::White),
                        ),
                        Span::styled(runtime, Style::default().fg(Color::DarkGray)),
                    ]);
                    ListItem::new(line)
                })
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
            if focused {
                list_state.select(Some(ready.episode_sel));
            }
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn render_similar(ready: &DetailsReady, frame: &mut Frame, area: Rect) {
    let focused = ready.focus == DetailsFocus::Similar;
    let title_style = if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(" You may also like", title_style)),
        Rect { height: 1, ..area },
    );

    let strip = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1).min(TILE_HEIGHT),
    };
    if strip.height == 0 {
        return;
    }
    if ready.similar.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Nothing similar found.",
                Style::default().fg(Color::DarkGray),
            )),
            strip,
        );
        return;
    }
    for (slot, item) in ready
        .similar
        .iter()
        .skip(ready.similar_scroll)
        .enumerate()
    {
        let tile_area = Rect {
            x: strip.x + (slot as u16) * TILE_WIDTH,
            y: strip.y,
            width: TILE_WIDTH.saturating_sub(1),
            height: strip.height,
        };
        if tile_area.right() > strip.right() {
            break;
        }
        let selected = focused && ready.similar_scroll + slot == ready.similar_sel;
        render_tile(item, selected, frame, tile_area);
    }
}

fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    }
}

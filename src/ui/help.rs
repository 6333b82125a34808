use super::centered_rect;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let key = |k: &str| Span::styled(format!("    {k:<10}"), Style::default().fg(Color::Yellow));
    let section = |s: &str| {
        Line::from(Span::styled(
            format!("  {s}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        Line::from(""),
        section("Global"),
        Line::from(vec![key("1-6"), Span::raw("Switch view")]),
        Line::from(vec![key("Bksp / n"), Span::raw("History back / forward")]),
        Line::from(vec![key("/"), Span::raw("Search")]),
        Line::from(vec![key("?"), Span::raw("Toggle this help")]),
        Line::from(vec![key("q"), Span::raw("Quit")]),
        Line::from(""),
        section("Browsing"),
        Line::from(vec![key("↑↓←→ hjkl"), Span::raw("Move between rows and tiles")]),
        Line::from(vec![key("g / G"), Span::raw("Jump to row start / end")]),
        Line::from(vec![key("Enter"), Span::raw("Open details")]),
        Line::from(vec![key("p"), Span::raw("Play title")]),
        Line::from(vec![key("a"), Span::raw("Add/remove My List")]),
        Line::from(vec![key("v"), Span::raw("View all of the current row")]),
        Line::from(""),
        section("Search"),
        Line::from(vec![key("Enter"), Span::raw("Submit query")]),
        Line::from(vec![key("t"), Span::raw("Cycle type filter")]),
        Line::from(vec![key("y"), Span::raw("Edit year filter")]),
        Line::from(""),
        section("Details"),
        Line::from(vec![key("Tab"), Span::raw("Switch panel")]),
        Line::from(vec![key("[ ]"), Span::raw("Previous / next season")]),
        Line::from(vec![key("Enter"), Span::raw("Play episode / open similar")]),
        Line::from(""),
        section("Player"),
        Line::from(vec![key("o"), Span::raw("Open stream in browser")]),
        Line::from(vec![key("any key"), Span::raw("Show controls")]),
        Line::from(""),
        section("My List"),
        Line::from(vec![key("x"), Span::raw("Remove entry")]),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(
                    Line::from(" Press ? or Esc to close ")
                        .style(Style::default().fg(Color::DarkGray)),
                ),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}

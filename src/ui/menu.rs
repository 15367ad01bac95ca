use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{draw_help, draw_title, layout::calculate_screen_chunks};
use crate::app::{App, MENU_ITEMS};

pub fn draw_menu(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "AICademy");

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(MENU_ITEMS.len() as u16 + 2), Constraint::Length(4)])
        .split(layout.body_area);

    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            let style = if i == app.menu_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if i == app.menu_index { "> " } else { "  " };
            ListItem::new(format!("{}{}. {}", marker, i + 1, label)).style(style)
        })
        .collect();

    let menu = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Learn")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(menu, body[0]);

    let (status_text, status_color) = if app.ai_enabled {
        (format!("AI: connected ({})", app.model_name), Color::Green)
    } else {
        (
            "AI: disabled (set OPENROUTER_API_KEY to enable)".to_string(),
            Color::Yellow,
        )
    };
    let storage_line = if app.store().is_available() {
        Line::from(Span::styled(
            "Progress: saved locally",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            "Progress: storage unavailable, scores will not be kept",
            Style::default().fg(Color::Red),
        ))
    };
    let status = Paragraph::new(vec![
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
        storage_line,
    ])
    .alignment(Alignment::Left)
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, body[1]);

    draw_help(
        f,
        layout.help_area,
        &[("↑↓", "Navigate"), ("Enter", "Open"), ("1-5", "Jump"), ("q", "Quit")],
    );
}

pub mod layout;
mod assistant;
mod dashboard;
mod menu;
mod quiz;
mod theory;

pub use assistant::{draw_ask, draw_summarize};
pub use dashboard::draw_dashboard;
pub use layout::{calculate_quiz_chunks, calculate_screen_chunks};
pub use menu::draw_menu;
pub use quiz::{draw_quiz, draw_quiz_setup};
pub use theory::{draw_theory, draw_theory_picker};

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::AppState;
use crate::utils::{
    TextInput, calculate_max_scroll, calculate_wrapped_cursor_position, estimate_text_height,
};

pub fn draw(f: &mut Frame, app: &App) {
    match app.state {
        AppState::Menu => draw_menu(f, app),
        AppState::QuizSetup => draw_quiz_setup(f, app),
        AppState::Quiz => draw_quiz(f, app),
        AppState::TheoryPicker => draw_theory_picker(f, app),
        AppState::Theory => draw_theory(f, app),
        AppState::Ask => draw_ask(f, app),
        AppState::Summarize => draw_summarize(f, app),
        AppState::Dashboard => draw_dashboard(f, app),
    }
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_title(f: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(title.to_string())
        .style(key_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

/// One line of `key description` pairs.
fn draw_help(f: &mut Frame, area: Rect, keys: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::from("  "));
        }
        spans.push(Span::styled(key.to_string(), key_style()));
        spans.push(Span::from(format!(" {}", action)));
    }
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn notice_line(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Bordered text field. Places the terminal cursor when `focused`.
fn draw_input(
    f: &mut Frame,
    area: Rect,
    title: &str,
    input: &TextInput,
    placeholder: &str,
    focused: bool,
) {
    let content = if input.is_empty() {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(input.value().to_string())
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) =
        calculate_wrapped_cursor_position(input.value(), input.cursor(), inner_width);
    let scroll = cursor_line.saturating_sub(inner_height.saturating_sub(1)) as u16;

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(focus_style(focused)),
        );
    f.render_widget(paragraph, area);

    if focused && inner_width > 0 && inner_height > 0 {
        let x = area.x + 1 + (cursor_col as u16).min(area.width.saturating_sub(3));
        let y = area.y + 1 + (cursor_line as u16).saturating_sub(scroll);
        f.set_cursor_position((x, y));
    }
}

/// Wrapped, scrollable output pane. `scroll` is clamped to the content.
fn draw_output(f: &mut Frame, area: Rect, title: &str, text: Text<'static>, scroll: u16) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = calculate_max_scroll(estimate_text_height(&text, inner_width), inner_height);
    let title = if max_scroll > 0 {
        format!("{} (PgUp/PgDn)", title)
    } else {
        title.to_string()
    };

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(max_scroll), 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}

use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{
    draw_help, draw_input, draw_output, draw_title, focus_style,
    layout::{calculate_screen_chunks, split_columns, stack},
    notice_line,
};
use crate::app::{App, AskField, SummarizeFocus};
use crate::assistant::{StoredSummary, TaskState};
use crate::utils::{render_markdown, truncate_string};

const HISTORY_PREVIEW_LEN: usize = 40;

fn task_text(state: &TaskState<String>, waiting: &str, empty: &str) -> Text<'static> {
    match state {
        TaskState::Idle => Text::from(Line::from(Span::styled(
            empty.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
        TaskState::Pending(_) => Text::from(notice_line(waiting, Color::Yellow)),
        TaskState::Done(content) => Text::from(render_markdown(content)),
        TaskState::Failed(message) => Text::from(notice_line(message, Color::Red)),
    }
}

pub fn draw_ask(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "Ask a Question");

    let rows = stack(layout.body_area, &[3, 5, 1]);
    draw_input(
        f,
        rows[0],
        "Question",
        &app.ask.question,
        "What would you like explained?",
        app.ask.focus == AskField::Question,
    );
    draw_input(
        f,
        rows[1],
        "Course material",
        &app.ask.material,
        "Paste the notes or chapter the question is about",
        app.ask.focus == AskField::Material,
    );
    if let Some(error) = &app.ask.error {
        f.render_widget(Paragraph::new(notice_line(error, Color::Red)), rows[2]);
    }

    let answer = task_text(
        app.explanation.state(),
        "Thinking...",
        "The explanation will appear here.",
    );
    draw_output(f, rows[3], "Explanation", answer, app.output_scroll);

    draw_help(
        f,
        layout.help_area,
        &[
            ("Tab", "Switch field"),
            ("Enter", "Ask"),
            ("PgUp/PgDn", "Scroll"),
            ("Esc", "Menu"),
        ],
    );
}

fn history_item(entry: &StoredSummary, selected: bool) -> ListItem<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let date = entry.timestamp.get(..10).unwrap_or(&entry.timestamp).to_string();
    ListItem::new(vec![
        Line::from(Span::styled(date, Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            truncate_string(&entry.summary.replace('\n', " "), HISTORY_PREVIEW_LEN),
            style,
        )),
    ])
}

pub fn draw_summarize(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "Summarize Content");

    let (main, side) = split_columns(layout.body_area, 65);
    let rows = stack(main, &[8, 1]);

    let chars = app.summarize_text.value().chars().count();
    draw_input(
        f,
        rows[0],
        &format!("Text to summarize ({} chars)", chars),
        &app.summarize_text,
        "Paste at least 100 characters of text",
        app.summarize_focus == SummarizeFocus::Text,
    );
    if let Some(error) = &app.summarize_error {
        f.render_widget(Paragraph::new(notice_line(error, Color::Red)), rows[1]);
    }

    let summary = task_text(
        app.summary.state(),
        "Summarizing...",
        "The summary will appear here.",
    );
    draw_output(f, rows[2], "Summary", summary, app.output_scroll);

    let history_focused = app.summarize_focus == SummarizeFocus::History;
    let items: Vec<ListItem> = if app.summaries.is_empty() {
        vec![ListItem::new("No saved summaries").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        app.summaries
            .iter()
            .enumerate()
            .map(|(i, entry)| history_item(entry, history_focused && i == app.summary_index))
            .collect()
    };
    let history = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Recent summaries")
            .border_style(focus_style(history_focused)),
    );
    f.render_widget(history, side);

    let keys: &[(&str, &str)] = if history_focused {
        &[("↑↓", "Select"), ("Enter", "Open"), ("Tab", "Text"), ("Esc", "Menu")]
    } else {
        &[
            ("Enter", "Summarize"),
            ("Tab", "History"),
            ("PgUp/PgDn", "Scroll"),
            ("Esc", "Menu"),
        ]
    };
    draw_help(f, layout.help_area, keys);
}

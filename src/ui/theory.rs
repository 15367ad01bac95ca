use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use super::{
    draw_help, draw_input, draw_output, draw_title, key_style,
    layout::calculate_screen_chunks,
    notice_line,
};
use crate::app::App;
use crate::models::ImageBlob;
use crate::theory::TheoryState;
use crate::utils::{estimate_text_height, render_markdown};

pub fn draw_theory_picker(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "Theory Exam - Choose a Chapter");

    let mut last_subject = "";
    let mut items: Vec<ListItem> = Vec::new();
    for (i, (subject, chapter)) in app.chapters.iter().enumerate() {
        if *subject != last_subject {
            items.push(ListItem::new(Line::from(Span::styled(
                subject.to_string(),
                key_style(),
            ))));
            last_subject = subject;
        }
        let (marker, style) = if i == app.chapter_index {
            (
                "> ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("  ", Style::default())
        };
        items.push(ListItem::new(format!("{}{}", marker, chapter)).style(style));
    }

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Chapters"));
    f.render_widget(list, layout.body_area);

    draw_help(
        f,
        layout.help_area,
        &[("↑↓", "Navigate"), ("Enter", "Start exam"), ("Esc", "Menu")],
    );
}

fn questions_text(questions: &[String]) -> Text<'static> {
    let mut text = Text::default();
    for (i, question) in questions.iter().enumerate() {
        text.push_line(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), key_style()),
            Span::from(question.clone()),
        ]));
    }
    text
}

fn image_line(image: Option<&ImageBlob>) -> Line<'static> {
    match image {
        Some(blob) => Line::from(Span::styled(
            format!("Photo ready: {} ({} KB)", blob.mime_type, blob.bytes.len().div_ceil(1024)),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            "No photo selected yet.",
            Style::default().fg(Color::DarkGray),
        )),
    }
}

pub fn draw_theory(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    let chapter = app.theory.chapter().unwrap_or("Theory Exam");
    let title = match app.theory.subject() {
        Some(subject) => format!("{} - {}", subject, chapter),
        None => chapter.to_string(),
    };
    draw_title(f, layout.header_area, &title);

    let state = app.theory.state();
    let keys: Vec<(&str, &str)> = match state {
        TheoryState::Idle => vec![("Enter", "Retry"), ("Esc", "Chapters")],
        TheoryState::Generating { .. } | TheoryState::Grading { .. } => {
            vec![("Ctrl+R", "Restart"), ("Esc", "Chapters")]
        }
        TheoryState::AwaitingUpload { .. } => vec![
            ("Enter", "Load photo"),
            ("Ctrl+G", "Grade"),
            ("Ctrl+R", "New questions"),
            ("Esc", "Chapters"),
        ],
        TheoryState::Graded { .. } => vec![
            ("r", "Retake"),
            ("d", "Dashboard"),
            ("Enter", "Chapters"),
        ],
    };

    match state {
        TheoryState::Idle => {
            let message = app
                .theory
                .error()
                .map(|e| notice_line(e, Color::Red))
                .or_else(|| app.theory_notice.as_deref().map(|n| notice_line(n, Color::Red)))
                .unwrap_or_else(|| Line::from("Press Enter to generate exam questions."));
            let body = Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(body, layout.body_area);
        }
        TheoryState::Generating { .. } => {
            let body = Paragraph::new(notice_line(
                &format!("Generating exam questions for {}...", chapter),
                Color::Yellow,
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(body, layout.body_area);
        }
        TheoryState::AwaitingUpload { questions, image } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(4),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(layout.body_area);

            let list = Paragraph::new(questions_text(questions))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Answer these on paper, then upload a photo"),
                );
            f.render_widget(list, parts[0]);

            draw_input(
                f,
                parts[1],
                "Photo path",
                &app.image_path,
                "/path/to/answers.jpg",
                true,
            );

            let mut status = vec![image_line(image.as_ref())];
            if let Some(notice) = app.theory_notice.as_deref().or(app.theory.error()) {
                status = vec![notice_line(notice, Color::Yellow)];
            }
            f.render_widget(
                Paragraph::new(status).block(Block::default().borders(Borders::ALL)),
                parts[2],
            );
        }
        TheoryState::Grading { questions, image, .. } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(4), Constraint::Length(4)])
                .split(layout.body_area);
            let list = Paragraph::new(questions_text(questions))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Questions"));
            f.render_widget(list, parts[0]);
            let status = Paragraph::new(vec![
                image_line(Some(image)),
                notice_line("Grading your answers...", Color::Yellow),
            ])
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(status, parts[1]);
        }
        TheoryState::Graded {
            questions,
            result,
            saved,
        } => {
            let questions = questions_text(questions);
            let inner_width = layout.body_area.width.saturating_sub(2) as usize;
            let wanted = estimate_text_height(&questions, inner_width) as u16 + 2;
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Max(wanted.min(layout.body_area.height / 2)),
                    Constraint::Min(4),
                ])
                .split(layout.body_area);

            f.render_widget(
                Paragraph::new(questions)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).title("Questions")),
                parts[0],
            );

            let mut feedback = Text::default();
            feedback.push_line(Line::from(Span::styled(
                format!("Score: {}%", result.score),
                Style::default()
                    .fg(if result.score >= 50 {
                        Color::Green
                    } else {
                        Color::Red
                    })
                    .add_modifier(Modifier::BOLD),
            )));
            if !saved {
                feedback.push_line(notice_line(
                    "Your score could not be saved to progress.",
                    Color::Red,
                ));
            }
            feedback.push_line(Line::from(""));
            for line in render_markdown(&result.feedback) {
                feedback.push_line(line);
            }
            draw_output(f, parts[1], "Feedback", feedback, app.output_scroll);
        }
    }

    draw_help(f, layout.help_area, &keys);
}

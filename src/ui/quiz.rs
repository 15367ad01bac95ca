use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{
    draw_help, draw_input, draw_title, focus_style, key_style,
    layout::{calculate_quiz_chunks, calculate_screen_chunks, stack},
    notice_line,
};
use crate::app::{App, QuizField};
use crate::models::{MAX_QUESTIONS, MIN_QUESTIONS};
use crate::quiz::{AnswerOutcome, QuizResult, QuizSession, QuizState};

fn selector_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{:<12}", label), focus_style(focused)),
        Span::styled(format!("< {} >", value), value_style),
    ])
}

pub fn draw_quiz_setup(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "Generate a Quiz");

    let form = &app.quiz_form;
    let rows = stack(layout.body_area, &[3, 5, 2]);

    draw_input(
        f,
        rows[0],
        "Topic",
        &form.topic,
        "e.g. Photosynthesis, The Roman Empire",
        form.focus == QuizField::Topic,
    );

    let settings = Paragraph::new(vec![
        selector_line(
            "Questions",
            format!("{} ({}-{})", form.count, MIN_QUESTIONS, MAX_QUESTIONS),
            form.focus == QuizField::Count,
        ),
        selector_line(
            "Difficulty",
            form.difficulty.to_string(),
            form.focus == QuizField::Difficulty,
        ),
        selector_line("Mode", form.mode.label().to_string(), form.focus == QuizField::Mode),
    ])
    .block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(settings, rows[1]);

    if let Some(error) = &form.error {
        f.render_widget(Paragraph::new(notice_line(error, Color::Red)), rows[2]);
    } else if !app.ai_enabled {
        f.render_widget(
            Paragraph::new(notice_line(
                "AI is disabled; quiz generation will fail.",
                Color::Yellow,
            )),
            rows[2],
        );
    }

    draw_help(
        f,
        layout.help_area,
        &[
            ("Tab", "Next field"),
            ("←→", "Change"),
            ("Enter", "Generate"),
            ("Esc", "Menu"),
        ],
    );
}

pub fn draw_quiz(f: &mut Frame, app: &App) {
    match app.quiz.state() {
        QuizState::Idle { error } => draw_quiz_message(
            f,
            "Quiz",
            error
                .as_deref()
                .map(|e| notice_line(e, Color::Red))
                .unwrap_or_else(|| Line::from("No quiz in progress.")),
            &[("Enter", "New quiz"), ("Esc", "Menu")],
        ),
        QuizState::Generating { request, .. } => draw_quiz_message(
            f,
            "Quiz",
            notice_line(
                &format!(
                    "Generating {} {} questions on {}...",
                    request.number_of_questions, request.difficulty, request.topic
                ),
                Color::Yellow,
            ),
            &[("Esc", "Cancel")],
        ),
        QuizState::Presenting(session) => draw_question(f, app, session, None),
        QuizState::Answered { session, outcome } => draw_question(f, app, session, Some(outcome)),
        QuizState::Finished(result) => draw_result(f, result),
    }
}

fn draw_quiz_message(f: &mut Frame, title: &str, message: Line<'static>, keys: &[(&str, &str)]) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, title);
    let body = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, layout.body_area);
    draw_help(f, layout.help_area, keys);
}

fn draw_question(f: &mut Frame, app: &App, session: &QuizSession, outcome: Option<&AnswerOutcome>) {
    let layout = calculate_quiz_chunks(f.area());
    let Some(question) = session.current_question() else {
        return;
    };

    let progress = format!(
        "Question {} / {} - {}    Score: {}",
        session.current_index() + 1,
        session.total(),
        session.topic(),
        session.score()
    );
    draw_title(f, layout.header_area, &progress);

    let question_widget = Paragraph::new(Text::from(question.question.as_str()))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(question_widget, layout.question_area);

    match &question.options {
        Some(options) => draw_options(f, layout.answer_area, options, app.option_index, outcome),
        None => match outcome {
            Some(outcome) => draw_blank_outcome(f, layout.answer_area, outcome),
            None => draw_input(
                f,
                layout.answer_area,
                "Your Answer",
                &app.answer_input,
                "Type the missing word",
                true,
            ),
        },
    }

    let status = match (outcome, &app.quiz_notice) {
        (_, Some(notice)) => notice_line(notice, Color::Red),
        (Some(outcome), None) if outcome.is_correct => notice_line("Correct!", Color::Green),
        (Some(outcome), None) => notice_line(
            &format!("Incorrect. The answer is {}", outcome.correct_answer),
            Color::Red,
        ),
        (None, None) => Line::from(""),
    };
    f.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        layout.status_area,
    );

    let next_label = if session.is_last_question() {
        "Finish"
    } else {
        "Next"
    };
    let keys: Vec<(&str, &str)> = match (outcome, &question.options) {
        (Some(_), _) => vec![("Enter", next_label), ("Esc", "Quit quiz")],
        (None, Some(_)) => vec![
            ("↑↓", "Select"),
            ("1-4", "Pick"),
            ("Enter", "Submit"),
            ("Esc", "Quit quiz"),
        ],
        (None, None) => vec![("Enter", "Submit"), ("Esc", "Quit quiz")],
    };
    draw_help(f, layout.help_area, &keys);
}

fn draw_options(
    f: &mut Frame,
    area: Rect,
    options: &[String],
    selected: usize,
    outcome: Option<&AnswerOutcome>,
) {
    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = match outcome {
                Some(o) if *option == o.correct_answer => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                Some(o) if *option == o.given => Style::default().fg(Color::Red),
                Some(_) => Style::default().fg(Color::DarkGray),
                None if i == selected => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                None => Style::default(),
            };
            let marker = if outcome.is_none() && i == selected {
                "> "
            } else {
                "  "
            };
            Line::from(Span::styled(format!("{}{}. {}", marker, i + 1, option), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Options")
                .border_style(focus_style(outcome.is_none())),
        );
    f.render_widget(widget, area);
}

fn draw_blank_outcome(f: &mut Frame, area: Rect, outcome: &AnswerOutcome) {
    let mut text = Text::default();
    text.push_line(Line::from(Span::styled(
        "Your Answer:",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    text.push_line(Line::from(outcome.given.clone()));
    text.push_line(Line::from(""));
    text.push_line(Line::from(Span::styled(
        "Correct Answer:",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )));
    text.push_line(Line::from(outcome.correct_answer.clone()));

    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Answer"));
    f.render_widget(widget, area);
}

fn draw_result(f: &mut Frame, result: &QuizResult) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "Quiz Complete");

    let color = match result.percent {
        80..=100 => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    };
    let mut lines = vec![
        Line::from(Span::styled(result.topic.clone(), key_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "You scored {} / {} ({}%)",
                result.correct, result.total, result.percent
            ),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Recorded under {}", result.subject)),
    ];
    if !result.saved {
        lines.push(Line::from(""));
        lines.push(notice_line(
            "Your score could not be saved to progress.",
            Color::Red,
        ));
    }

    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, layout.body_area);

    draw_help(
        f,
        layout.help_area,
        &[("Enter", "New quiz"), ("d", "Dashboard"), ("Esc", "Menu")],
    );
}

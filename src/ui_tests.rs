//! Render checks for every screen against an in-memory terminal.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use crossbeam_channel::{Receiver, unbounded};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};

use crate::ai_worker::{GatewayReply, GatewayRequest, GatewayResult};
use crate::app::App;
use crate::models::{AppState, GradingResult, QuizQuestion, ScoreKind};
use crate::store::{MemoryBackend, ProgressStore};
use crate::ui;

fn test_app() -> (App, Receiver<GatewayRequest>) {
    let store = ProgressStore::new(Arc::new(MemoryBackend::default()));
    let (tx, rx) = unbounded();
    (App::new(store, tx, true, "test-model"), rx)
}

fn render(app: &App) -> String {
    render_sized(app, 100, 40)
}

fn render_sized(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for row in buffer.content().chunks(buffer.area.width as usize) {
        for cell in row {
            out.push_str(cell.symbol());
        }
        out.push('\n');
    }
    out
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

#[test]
fn test_menu_shows_items_and_model() {
    let (app, _rx) = test_app();
    let screen = render(&app);
    assert!(screen.contains("AICademy"));
    assert!(screen.contains("Generate a Quiz"));
    assert!(screen.contains("Progress Dashboard"));
    assert!(screen.contains("test-model"));
}

#[test]
fn test_menu_reports_disabled_ai() {
    let store = ProgressStore::detached();
    let (tx, _rx) = unbounded();
    let app = App::new(store, tx, false, "test-model");
    let screen = render(&app);
    assert!(screen.contains("AI: disabled"));
    assert!(screen.contains("storage unavailable"));
}

#[test]
fn test_quiz_setup_shows_validation_error() {
    let (mut app, _rx) = test_app();
    app.go_to(AppState::QuizSetup);
    press(&mut app, KeyCode::Enter);
    let screen = render(&app);
    assert!(screen.contains("Difficulty"));
    assert!(screen.contains("at least"));
}

#[test]
fn test_quiz_screens_follow_the_session() {
    let (mut app, rx) = test_app();
    app.go_to(AppState::QuizSetup);
    app.handle_paste("The Solar System");
    press(&mut app, KeyCode::Enter);
    assert!(render(&app).contains("Generating"));

    let request = rx.try_recv().unwrap();
    app.handle_reply(GatewayReply {
        token: request.token,
        result: GatewayResult::Quiz(Ok(vec![QuizQuestion {
            question: "Which planet is largest?".to_string(),
            answer: "Jupiter".to_string(),
            options: Some(vec![
                "Jupiter".to_string(),
                "Mars".to_string(),
                "Venus".to_string(),
                "Earth".to_string(),
            ]),
        }])),
    });
    let screen = render(&app);
    assert!(screen.contains("Question 1 / 1"));
    assert!(screen.contains("Which planet is largest?"));
    assert!(screen.contains("Jupiter"));

    press(&mut app, KeyCode::Enter);
    let screen = render(&app);
    assert!(screen.contains("Correct!") || screen.contains("Incorrect"));

    press(&mut app, KeyCode::Enter);
    let screen = render(&app);
    assert!(screen.contains("Quiz Complete"));
    assert!(screen.contains("Science"));
}

#[test]
fn test_theory_screens() {
    let (mut app, rx) = test_app();
    app.go_to(AppState::TheoryPicker);
    let screen = render(&app);
    assert!(screen.contains("Mathematics"));
    assert!(screen.contains("Algebra Basics"));

    press(&mut app, KeyCode::Enter);
    assert!(render(&app).contains("Generating exam questions"));

    let request = rx.try_recv().unwrap();
    app.handle_reply(GatewayReply {
        token: request.token,
        result: GatewayResult::TheoryQuestions(Ok(vec![
            "Solve 3x + 2 = 11.".to_string(),
            "Factor x^2 - 9.".to_string(),
        ])),
    });
    let screen = render(&app);
    assert!(screen.contains("Solve 3x + 2 = 11."));
    assert!(screen.contains("Photo path"));
    assert!(screen.contains("No photo selected"));
}

#[test]
fn test_theory_grading_feedback_is_rendered() {
    let (mut app, rx) = test_app();
    app.go_to(AppState::TheoryPicker);
    press(&mut app, KeyCode::Enter);
    let request = rx.try_recv().unwrap();
    app.handle_reply(GatewayReply {
        token: request.token,
        result: GatewayResult::TheoryQuestions(Ok(vec!["Define a variable.".to_string()])),
    });

    let photo = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    std::fs::write(photo.path(), [0xff, 0xd8, 0xff]).unwrap();
    app.handle_paste(&photo.path().display().to_string());
    press(&mut app, KeyCode::Enter);
    app.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));
    let request = rx.try_recv().unwrap();
    assert!(render(&app).contains("Grading your answers"));

    app.handle_reply(GatewayReply {
        token: request.token,
        result: GatewayResult::Grade(Ok(GradingResult {
            feedback: "**Good** definition.".to_string(),
            score: 80,
        })),
    });
    let screen = render(&app);
    assert!(screen.contains("Score: 80%"));
    assert!(screen.contains("Good definition."));
}

#[test]
fn test_ask_and_summarize_screens() {
    let (mut app, _rx) = test_app();
    app.go_to(AppState::Ask);
    let screen = render(&app);
    assert!(screen.contains("Course material"));
    assert!(screen.contains("The explanation will appear here."));

    app.go_to(AppState::Summarize);
    let screen = render(&app);
    assert!(screen.contains("Text to summarize (0 chars)"));
    assert!(screen.contains("No saved summaries"));
}

#[test]
fn test_dashboard_with_history() {
    let (mut app, _rx) = test_app();
    let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
    app.store()
        .record_score_at("History", "The Roman Empire", 70, ScoreKind::Quiz, at);
    app.go_to(AppState::Dashboard);

    let screen = render_sized(&app, 120, 40);
    assert!(screen.contains("Progress Dashboard"));
    assert!(screen.contains("History"));
    assert!(screen.contains("monthly average"));
    assert!(screen.contains("The Roman Empire"));
    assert!(!screen.contains("sample data"));
}

#[test]
fn test_dashboard_placeholder_trend() {
    let (mut app, _rx) = test_app();
    app.go_to(AppState::Dashboard);
    let screen = render_sized(&app, 120, 40);
    assert!(screen.contains("sample data"));
    assert!(screen.contains("Complete a quiz"));
}

#[test]
fn test_small_terminal_does_not_panic() {
    let (mut app, _rx) = test_app();
    for state in [
        AppState::Menu,
        AppState::QuizSetup,
        AppState::Quiz,
        AppState::TheoryPicker,
        AppState::Theory,
        AppState::Ask,
        AppState::Summarize,
        AppState::Dashboard,
    ] {
        app.go_to(state);
        render_sized(&app, 20, 8);
    }
}

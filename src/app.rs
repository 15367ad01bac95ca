//! Screen state and key handling for the terminal front-end.
//!
//! Gateway calls leave through the worker's request channel; replies come
//! back through [`App::handle_reply`] and are routed to the session that
//! issued them.

use std::path::Path;

use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ai::{ExplainRequest, SummarizeRequest};
use crate::ai_worker::{GatewayCall, GatewayReply, GatewayRequest, GatewayResult};
use crate::aggregator::{self, SubjectCompletion, TrendPoint};
use crate::assistant::{AssistantTask, StoredSummary, SummaryLog, TaskState};
use crate::catalog::{self, SUBJECTS};
use crate::error::GatewayError;
use crate::logger;
use crate::models::{
    AppState, Difficulty, HistoryEntry, ImageBlob, MAX_QUESTIONS, MIN_QUESTIONS, QuizMode,
    QuizRequest,
};
use crate::quiz::{QuizMachine, QuizState, RequestToken};
use crate::store::ProgressStore;
use crate::theory::{TheoryMachine, TheoryState};
use crate::utils::TextInput;

pub const MENU_ITEMS: [(&str, AppState); 5] = [
    ("Generate a Quiz", AppState::QuizSetup),
    ("Theory Exam", AppState::TheoryPicker),
    ("Ask a Question", AppState::Ask),
    ("Summarize Content", AppState::Summarize),
    ("Progress Dashboard", AppState::Dashboard),
];

pub const RECENT_HISTORY_LEN: usize = 8;
const SCROLL_STEP: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizField {
    #[default]
    Topic,
    Count,
    Difficulty,
    Mode,
}

impl QuizField {
    fn next(self) -> Self {
        match self {
            QuizField::Topic => QuizField::Count,
            QuizField::Count => QuizField::Difficulty,
            QuizField::Difficulty => QuizField::Mode,
            QuizField::Mode => QuizField::Topic,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizForm {
    pub topic: TextInput,
    pub count: usize,
    pub difficulty: Difficulty,
    pub mode: QuizMode,
    pub focus: QuizField,
    pub error: Option<String>,
}

impl Default for QuizForm {
    fn default() -> Self {
        let defaults = QuizRequest::default();
        Self {
            topic: TextInput::default(),
            count: defaults.number_of_questions,
            difficulty: defaults.difficulty,
            mode: defaults.mode,
            focus: QuizField::Topic,
            error: None,
        }
    }
}

impl QuizForm {
    pub fn request(&self) -> QuizRequest {
        QuizRequest {
            topic: self.topic.value().trim().to_string(),
            number_of_questions: self.count,
            difficulty: self.difficulty,
            mode: self.mode,
        }
    }

    fn adjust(&mut self, forward: bool) {
        match self.focus {
            QuizField::Topic => {}
            QuizField::Count if forward => self.count = (self.count + 1).min(MAX_QUESTIONS),
            QuizField::Count => self.count = self.count.saturating_sub(1).max(MIN_QUESTIONS),
            QuizField::Difficulty if forward => self.difficulty = self.difficulty.next(),
            QuizField::Difficulty => self.difficulty = self.difficulty.next().next(),
            QuizField::Mode => self.mode = self.mode.toggle(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AskField {
    #[default]
    Question,
    Material,
}

#[derive(Debug, Clone, Default)]
pub struct AskForm {
    pub question: TextInput,
    pub material: TextInput,
    pub focus: AskField,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizeFocus {
    #[default]
    Text,
    History,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub completion: Vec<SubjectCompletion>,
    pub trend: Vec<TrendPoint>,
    pub recent: Vec<HistoryEntry>,
    pub storage_available: bool,
}

impl DashboardView {
    pub fn load(store: &ProgressStore) -> Self {
        let progress = store.read_progress();
        let history = store.read_history();
        Self {
            completion: aggregator::dashboard_subjects(SUBJECTS, &progress),
            trend: aggregator::performance_trend(&history),
            recent: history.into_iter().take(RECENT_HISTORY_LEN).collect(),
            storage_available: store.is_available(),
        }
    }
}

pub struct App {
    pub state: AppState,
    pub menu_index: usize,
    pub should_quit: bool,
    pub ai_enabled: bool,
    pub model_name: String,
    store: ProgressStore,
    requests: Sender<GatewayRequest>,

    pub quiz_form: QuizForm,
    pub quiz: QuizMachine,
    pub answer_input: TextInput,
    pub option_index: usize,
    pub quiz_notice: Option<String>,

    pub chapters: Vec<(&'static str, &'static str)>,
    pub chapter_index: usize,
    pub theory: TheoryMachine,
    pub image_path: TextInput,
    pub theory_notice: Option<String>,

    pub ask: AskForm,
    pub explanation: AssistantTask<String>,

    pub summarize_text: TextInput,
    pub summarize_focus: SummarizeFocus,
    pub summarize_error: Option<String>,
    pub summary: AssistantTask<String>,
    pub summaries: Vec<StoredSummary>,
    pub summary_index: usize,
    summary_log: SummaryLog,
    pending_original: Option<(RequestToken, String)>,

    pub dashboard: DashboardView,
    /// Scroll offset of the AI output pane; clamped when drawn.
    pub output_scroll: u16,
}

fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

impl App {
    pub fn new(
        store: ProgressStore,
        requests: Sender<GatewayRequest>,
        ai_enabled: bool,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            state: AppState::Menu,
            menu_index: 0,
            should_quit: false,
            ai_enabled,
            model_name: model_name.into(),
            quiz_form: QuizForm::default(),
            quiz: QuizMachine::new(store.clone()),
            answer_input: TextInput::default(),
            option_index: 0,
            quiz_notice: None,
            chapters: catalog::all_chapters().collect(),
            chapter_index: 0,
            theory: TheoryMachine::new(None, store.clone()),
            image_path: TextInput::default(),
            theory_notice: None,
            ask: AskForm::default(),
            explanation: AssistantTask::new(),
            summarize_text: TextInput::default(),
            summarize_focus: SummarizeFocus::Text,
            summarize_error: None,
            summary: AssistantTask::new(),
            summaries: Vec::new(),
            summary_index: 0,
            summary_log: SummaryLog::new(store.clone()),
            pending_original: None,
            dashboard: DashboardView::default(),
            output_scroll: 0,
            store,
            requests,
        }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn go_to(&mut self, state: AppState) {
        match state {
            AppState::Dashboard => self.dashboard = DashboardView::load(&self.store),
            AppState::Summarize => {
                self.summaries = self.summary_log.entries();
                self.summary_index = 0;
            }
            AppState::QuizSetup => self.quiz_form.error = None,
            _ => {}
        }
        self.output_scroll = 0;
        self.state = state;
    }

    fn dispatch(&mut self, token: RequestToken, call: GatewayCall) {
        if let Err(e) = self.requests.send(GatewayRequest { token, call }) {
            logger::error("Gateway worker is gone, failing request");
            let result = e.0.call.failed(GatewayError::Unavailable);
            self.handle_reply(GatewayReply { token, result });
        }
    }

    pub fn handle_reply(&mut self, reply: GatewayReply) {
        let GatewayReply { token, result } = reply;
        match result {
            GatewayResult::Quiz(result) => {
                if self.quiz.resolve_quiz(token, result) {
                    self.reset_answer();
                }
            }
            GatewayResult::TheoryQuestions(result) => {
                self.theory.resolve_questions(token, result);
            }
            GatewayResult::Grade(result) => {
                self.theory.resolve_grading(token, result);
            }
            GatewayResult::Explain(result) => {
                self.explanation
                    .resolve(token, result, "Failed to get an answer. Please try again.");
            }
            GatewayResult::Summarize(result) => {
                let summary = result.as_ref().ok().cloned();
                let applied = self.summary.resolve(
                    token,
                    result,
                    "Failed to summarize the content. Please try again.",
                );
                if applied
                    && let Some(summary) = summary
                    && let Some((pending, original)) = self.pending_original.take()
                    && pending == token
                {
                    self.summaries = self.summary_log.push(&original, &summary);
                    self.summary_index = 0;
                }
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self.state {
            AppState::QuizSetup if self.quiz_form.focus == QuizField::Topic => {
                self.quiz_form.topic.insert_str(text)
            }
            AppState::Quiz if matches!(self.quiz.state(), QuizState::Presenting(_)) => {
                self.answer_input.insert_str(text)
            }
            AppState::Theory => self.image_path.insert_str(text.trim()),
            AppState::Ask => match self.ask.focus {
                AskField::Question => self.ask.question.insert_str(text),
                AskField::Material => self.ask.material.insert_str(text),
            },
            AppState::Summarize if self.summarize_focus == SummarizeFocus::Text => {
                self.summarize_text.insert_str(text)
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if is_ctrl(&key, 'c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::PageDown => {
                self.output_scroll = self.output_scroll.saturating_add(SCROLL_STEP);
                return;
            }
            KeyCode::PageUp => {
                self.output_scroll = self.output_scroll.saturating_sub(SCROLL_STEP);
                return;
            }
            _ => {}
        }
        match self.state {
            AppState::Menu => self.handle_menu_key(key),
            AppState::QuizSetup => self.handle_quiz_setup_key(key),
            AppState::Quiz => self.handle_quiz_key(key),
            AppState::TheoryPicker => self.handle_theory_picker_key(key),
            AppState::Theory => self.handle_theory_key(key),
            AppState::Ask => self.handle_ask_key(key),
            AppState::Summarize => self.handle_summarize_key(key),
            AppState::Dashboard => match key.code {
                KeyCode::Char('r') => self.dashboard = DashboardView::load(&self.store),
                KeyCode::Esc | KeyCode::Char('q') => self.go_to(AppState::Menu),
                _ => {}
            },
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.menu_index = self.menu_index.saturating_sub(1),
            KeyCode::Down => self.menu_index = (self.menu_index + 1).min(MENU_ITEMS.len() - 1),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.menu_index = index;
                self.go_to(MENU_ITEMS[index].1);
            }
            KeyCode::Enter => {
                if let Some((_, target)) = MENU_ITEMS.get(self.menu_index) {
                    self.go_to(*target);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_quiz_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.go_to(AppState::Menu),
            KeyCode::Tab | KeyCode::Down => self.quiz_form.focus = self.quiz_form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => {
                self.quiz_form.focus = self.quiz_form.focus.next().next().next()
            }
            KeyCode::Enter => self.start_quiz(),
            _ if self.quiz_form.focus == QuizField::Topic => {
                edit_text(&mut self.quiz_form.topic, key)
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char(' ') => self.quiz_form.adjust(true),
            KeyCode::Left | KeyCode::Char('-') => self.quiz_form.adjust(false),
            _ => {}
        }
    }

    fn start_quiz(&mut self) {
        let request = self.quiz_form.request();
        match self.quiz.request_quiz(request.clone()) {
            Ok(token) => {
                self.quiz_form.error = None;
                self.quiz_notice = None;
                self.reset_answer();
                self.state = AppState::Quiz;
                self.dispatch(token, GatewayCall::Quiz(request));
            }
            Err(e) => self.quiz_form.error = Some(e.to_string()),
        }
    }

    fn reset_answer(&mut self) {
        self.answer_input.clear();
        self.option_index = 0;
    }

    fn leave_quiz(&mut self, target: AppState) {
        self.quiz.start_over();
        self.reset_answer();
        self.quiz_notice = None;
        self.go_to(target);
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        match self.quiz.state() {
            QuizState::Idle { .. } => match key.code {
                KeyCode::Enter | KeyCode::Char('r') => self.go_to(AppState::QuizSetup),
                KeyCode::Esc => self.go_to(AppState::Menu),
                _ => {}
            },
            QuizState::Generating { .. } => {
                if key.code == KeyCode::Esc {
                    self.leave_quiz(AppState::QuizSetup);
                }
            }
            QuizState::Presenting(_) => self.handle_question_key(key),
            QuizState::Answered { .. } => match key.code {
                KeyCode::Enter | KeyCode::Right | KeyCode::Char('n') => {
                    if let Err(e) = self.quiz.next() {
                        self.quiz_notice = Some(e.to_string());
                    } else {
                        self.reset_answer();
                        self.quiz_notice = None;
                    }
                }
                KeyCode::Esc => self.leave_quiz(AppState::QuizSetup),
                _ => {}
            },
            QuizState::Finished(_) => match key.code {
                KeyCode::Enter | KeyCode::Char('r') => self.leave_quiz(AppState::QuizSetup),
                KeyCode::Char('d') => self.leave_quiz(AppState::Dashboard),
                KeyCode::Esc | KeyCode::Char('m') => self.leave_quiz(AppState::Menu),
                _ => {}
            },
        }
    }

    fn handle_question_key(&mut self, key: KeyEvent) {
        let options = self
            .quiz
            .session()
            .and_then(|s| s.current_question())
            .and_then(|q| q.options.clone());

        match (key.code, options) {
            (KeyCode::Esc, _) => self.leave_quiz(AppState::QuizSetup),
            (KeyCode::Up, Some(_)) => self.option_index = self.option_index.saturating_sub(1),
            (KeyCode::Down, Some(options)) => {
                self.option_index = (self.option_index + 1).min(options.len().saturating_sub(1))
            }
            (KeyCode::Char(c @ '1'..='9'), Some(options)) => {
                let index = c as usize - '1' as usize;
                if index < options.len() {
                    self.option_index = index;
                }
            }
            (KeyCode::Enter, Some(options)) => {
                if let Some(choice) = options.get(self.option_index) {
                    self.submit_answer(choice.clone());
                }
            }
            (KeyCode::Enter, None) => self.submit_answer(self.answer_input.value().to_string()),
            (_, None) => edit_text(&mut self.answer_input, key),
            _ => {}
        }
    }

    fn submit_answer(&mut self, answer: String) {
        self.quiz_notice = self
            .quiz
            .submit_answer(&answer)
            .err()
            .map(|e| e.to_string());
    }

    fn handle_theory_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.chapter_index = self.chapter_index.saturating_sub(1),
            KeyCode::Down => {
                self.chapter_index = (self.chapter_index + 1).min(self.chapters.len().saturating_sub(1))
            }
            KeyCode::Enter => {
                if let Some((_, chapter)) = self.chapters.get(self.chapter_index) {
                    self.theory = TheoryMachine::new(Some(chapter.to_string()), self.store.clone());
                    self.image_path.clear();
                    self.state = AppState::Theory;
                    self.restart_theory();
                }
            }
            KeyCode::Esc => self.go_to(AppState::Menu),
            _ => {}
        }
    }

    fn restart_theory(&mut self) {
        self.theory_notice = None;
        self.output_scroll = 0;
        match self.theory.restart() {
            Ok((token, chapter)) => self.dispatch(token, GatewayCall::TheoryQuestions(chapter)),
            Err(e) => self.theory_notice = Some(e.to_string()),
        }
    }

    fn leave_theory(&mut self, target: AppState) {
        self.theory = TheoryMachine::new(None, self.store.clone());
        self.image_path.clear();
        self.theory_notice = None;
        self.go_to(target);
    }

    fn handle_theory_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.leave_theory(AppState::TheoryPicker);
            return;
        }
        if is_ctrl(&key, 'r') {
            self.restart_theory();
            return;
        }
        match self.theory.state() {
            TheoryState::Idle => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
                    self.restart_theory();
                }
            }
            TheoryState::AwaitingUpload { .. } => {
                if is_ctrl(&key, 'g') {
                    self.submit_theory();
                } else if key.code == KeyCode::Enter {
                    self.load_image();
                } else {
                    edit_text(&mut self.image_path, key);
                }
            }
            TheoryState::Graded { .. } => match key.code {
                KeyCode::Char('r') => self.restart_theory(),
                KeyCode::Char('d') => self.leave_theory(AppState::Dashboard),
                KeyCode::Enter => self.leave_theory(AppState::TheoryPicker),
                _ => {}
            },
            TheoryState::Generating { .. } | TheoryState::Grading { .. } => {}
        }
    }

    fn load_image(&mut self) {
        let raw = self.image_path.value().trim().to_string();
        if raw.is_empty() {
            self.theory_notice = Some("Enter the path to a photo of your answers.".to_string());
            return;
        }
        let path = Path::new(&raw);
        self.theory_notice = match ImageBlob::from_path(path) {
            Ok(blob) => match self.theory.select_image(blob) {
                Ok(()) => Some(format!("Selected {}", raw)),
                Err(e) => Some(e.to_string()),
            },
            Err(e) => {
                logger::warn(&format!("Could not read image {}: {}", raw, e));
                Some(format!("Could not read {}: {}", raw, e))
            }
        };
    }

    fn submit_theory(&mut self) {
        match self.theory.begin_grading() {
            Ok((token, request)) => {
                self.theory_notice = None;
                self.dispatch(token, GatewayCall::Grade(request));
            }
            Err(e) => self.theory_notice = Some(e.to_string()),
        }
    }

    fn handle_ask_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.explanation.reset();
                self.go_to(AppState::Menu);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.ask.focus = match self.ask.focus {
                    AskField::Question => AskField::Material,
                    AskField::Material => AskField::Question,
                }
            }
            KeyCode::Enter => self.submit_question(),
            _ => match self.ask.focus {
                AskField::Question => edit_text(&mut self.ask.question, key),
                AskField::Material => edit_text(&mut self.ask.material, key),
            },
        }
    }

    fn submit_question(&mut self) {
        let request = ExplainRequest {
            question: self.ask.question.value().trim().to_string(),
            course_material: self.ask.material.value().trim().to_string(),
        };
        if let Err(e) = request.validate() {
            self.ask.error = Some(e.to_string());
            return;
        }
        self.ask.error = None;
        self.output_scroll = 0;
        let token = self.explanation.begin();
        self.dispatch(token, GatewayCall::Explain(request));
    }

    fn handle_summarize_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.summary.reset();
                self.pending_original = None;
                self.go_to(AppState::Menu);
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.summarize_focus = match self.summarize_focus {
                    SummarizeFocus::Text if !self.summaries.is_empty() => SummarizeFocus::History,
                    _ => SummarizeFocus::Text,
                };
                return;
            }
            _ => {}
        }

        match self.summarize_focus {
            SummarizeFocus::Text => {
                if key.code == KeyCode::Enter {
                    self.submit_summary();
                } else {
                    edit_text(&mut self.summarize_text, key);
                }
            }
            SummarizeFocus::History => match key.code {
                KeyCode::Up => self.summary_index = self.summary_index.saturating_sub(1),
                KeyCode::Down => {
                    self.summary_index =
                        (self.summary_index + 1).min(self.summaries.len().saturating_sub(1))
                }
                KeyCode::Enter => {
                    if let Some(entry) = self.summaries.get(self.summary_index) {
                        self.summarize_text = TextInput::with_value(entry.original.clone());
                        self.summary.show(entry.summary.clone());
                        self.pending_original = None;
                    }
                }
                _ => {}
            },
        }
    }

    fn submit_summary(&mut self) {
        let request = SummarizeRequest {
            text: self.summarize_text.value().to_string(),
        };
        if let Err(e) = request.validate() {
            self.summarize_error = Some(e.to_string());
            return;
        }
        self.summarize_error = None;
        self.output_scroll = 0;
        let token = self.summary.begin();
        self.pending_original = Some((token, request.text.clone()));
        self.dispatch(token, GatewayCall::Summarize(request));
    }

    /// Any gateway call still outstanding for the visible screen.
    pub fn is_waiting(&self) -> bool {
        match self.state {
            AppState::Quiz => matches!(self.quiz.state(), QuizState::Generating { .. }),
            AppState::Theory => matches!(
                self.theory.state(),
                TheoryState::Generating { .. } | TheoryState::Grading { .. }
            ),
            AppState::Ask => self.explanation.is_pending(),
            AppState::Summarize => matches!(self.summary.state(), TaskState::Pending(_)),
            _ => false,
        }
    }
}

//! Quiz session state machine.
//!
//! `Idle -> Generating -> Presenting(i) -> Answered(i) -> ... -> Finished`.
//! Every generate request gets a fresh token; a reply is applied only while
//! the machine is still waiting on that exact token.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::seq::SliceRandom;

use crate::ai::Gateway;
use crate::catalog::{self, SUBJECTS, Subject};
use crate::error::{GatewayError, SessionError, ValidationError};
use crate::logger;
use crate::models::{QuizMode, QuizQuestion, QuizRequest, ScoreKind};
use crate::store::ProgressStore;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one gateway request. Unique for the life of the process, so a
/// reply can never be mistaken for one issued by another session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub(crate) u64);

impl RequestToken {
    pub fn issue() -> Self {
        RequestToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// `round(100 * correct / total)`, defined as 0 for an empty quiz.
pub fn score_percent(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (100.0 * correct.min(total) as f64 / total as f64).round();
    percent as u8
}

/// Multiple choice needs the exact option text; free text ignores case and
/// surrounding whitespace.
pub fn answer_matches(mode: QuizMode, given: &str, correct: &str) -> bool {
    match mode {
        QuizMode::MultipleChoice => given == correct,
        QuizMode::FillInTheBlank => given.trim().to_lowercase() == correct.trim().to_lowercase(),
    }
}

fn question_mode(question: &QuizQuestion) -> QuizMode {
    if question.options.is_some() {
        QuizMode::MultipleChoice
    } else {
        QuizMode::FillInTheBlank
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    request: QuizRequest,
    questions: Vec<QuizQuestion>,
    current_index: usize,
    score: usize,
    answers_given: Vec<String>,
}

impl QuizSession {
    fn new(request: QuizRequest, questions: Vec<QuizQuestion>) -> Self {
        Self {
            request,
            questions,
            current_index: 0,
            score: 0,
            answers_given: Vec::new(),
        }
    }

    pub fn topic(&self) -> &str {
        self.request.topic.trim()
    }

    pub fn request(&self) -> &QuizRequest {
        &self.request
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answers_given(&self) -> &[String] {
        &self.answers_given
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub given: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub topic: String,
    pub subject: String,
    pub correct: usize,
    pub total: usize,
    pub percent: u8,
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    Idle { error: Option<String> },
    Generating { token: RequestToken, request: QuizRequest },
    Presenting(QuizSession),
    Answered {
        session: QuizSession,
        outcome: AnswerOutcome,
    },
    Finished(QuizResult),
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Idle { .. } => "idle",
            QuizState::Generating { .. } => "generating",
            QuizState::Presenting(_) => "presenting",
            QuizState::Answered { .. } => "answered",
            QuizState::Finished(_) => "finished",
        }
    }
}

#[derive(Debug)]
pub struct QuizMachine {
    state: QuizState,
    store: ProgressStore,
    subjects: &'static [Subject],
}

impl QuizMachine {
    pub fn new(store: ProgressStore) -> Self {
        Self::with_subjects(store, SUBJECTS)
    }

    pub fn with_subjects(store: ProgressStore, subjects: &'static [Subject]) -> Self {
        Self {
            state: QuizState::Idle { error: None },
            store,
            subjects,
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            QuizState::Presenting(session) | QuizState::Answered { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Validate and enter `Generating`. Any current session or in-flight
    /// request is abandoned; only the returned token will be honoured.
    pub fn request_quiz(&mut self, request: QuizRequest) -> Result<RequestToken, ValidationError> {
        request.validate()?;
        let token = RequestToken::issue();
        logger::log(&format!(
            "Requesting quiz {:?}: {} x{} ({}, {})",
            token,
            request.topic.trim(),
            request.number_of_questions,
            request.difficulty,
            request.mode.label()
        ));
        self.state = QuizState::Generating { token, request };
        Ok(token)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        matches!(&self.state, QuizState::Generating { token: t, .. } if *t == token)
    }

    /// Apply a gateway reply. Returns `false` when the reply is stale and was dropped.
    pub fn resolve_quiz(
        &mut self,
        token: RequestToken,
        result: Result<Vec<QuizQuestion>, GatewayError>,
    ) -> bool {
        if !self.is_current(token) {
            logger::log(&format!("Dropping stale quiz reply {:?}", token));
            return false;
        }
        let QuizState::Generating { request, .. } =
            std::mem::replace(&mut self.state, QuizState::Idle { error: None })
        else {
            return false;
        };

        match result {
            Ok(mut questions) => {
                if questions.len() != request.number_of_questions {
                    logger::warn(&format!(
                        "Requested {} questions, received {}",
                        request.number_of_questions,
                        questions.len()
                    ));
                }
                let mut rng = rand::thread_rng();
                for question in &mut questions {
                    if let Some(options) = question.options.as_mut() {
                        options.shuffle(&mut rng);
                    }
                }
                let session = QuizSession::new(request, questions);
                if session.total() == 0 {
                    self.finish(session);
                } else {
                    self.state = QuizState::Presenting(session);
                }
            }
            Err(e) => {
                logger::error(&format!("Quiz generation failed: {}", e));
                self.state = QuizState::Idle {
                    error: Some("Failed to generate the quiz. Please try again.".to_string()),
                };
            }
        }
        true
    }

    /// Request and resolve in one step against `gateway`.
    pub async fn generate(
        &mut self,
        gateway: &dyn Gateway,
        request: QuizRequest,
    ) -> Result<bool, ValidationError> {
        let token = self.request_quiz(request.clone())?;
        let result = gateway.generate_quiz(&request).await;
        Ok(self.resolve_quiz(token, result))
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<&AnswerOutcome, SessionError> {
        let QuizState::Presenting(session) = &self.state else {
            return Err(SessionError::NotPresenting);
        };
        let Some(question) = session.current_question() else {
            return Err(SessionError::NotPresenting);
        };
        if answer.trim().is_empty() {
            return Err(ValidationError::EmptyAnswer.into());
        }
        let mode = question_mode(question);
        if let Some(options) = &question.options
            && !options.iter().any(|o| o == answer)
        {
            return Err(ValidationError::UnknownOption.into());
        }

        let is_correct = answer_matches(mode, answer, &question.answer);
        let outcome = AnswerOutcome {
            given: answer.to_string(),
            correct_answer: question.answer.clone(),
            is_correct,
        };

        let QuizState::Presenting(mut session) =
            std::mem::replace(&mut self.state, QuizState::Idle { error: None })
        else {
            return Err(SessionError::NotPresenting);
        };
        if is_correct {
            session.score += 1;
        }
        session.answers_given.push(outcome.given.clone());
        self.state = QuizState::Answered { session, outcome };

        match &self.state {
            QuizState::Answered { outcome, .. } => Ok(outcome),
            _ => Err(SessionError::NotAnswered),
        }
    }

    /// Move past the revealed answer to the next question or the final result.
    pub fn next(&mut self) -> Result<(), SessionError> {
        match &self.state {
            QuizState::Answered { .. } => {}
            QuizState::Finished(_) => return Err(SessionError::Finished),
            _ => return Err(SessionError::NotAnswered),
        }
        let QuizState::Answered { mut session, .. } =
            std::mem::replace(&mut self.state, QuizState::Idle { error: None })
        else {
            return Err(SessionError::NotAnswered);
        };

        if session.current_index + 1 < session.total() {
            session.current_index += 1;
            self.state = QuizState::Presenting(session);
        } else {
            self.finish(session);
        }
        Ok(())
    }

    /// Discard everything without persisting and ignore any in-flight reply.
    pub fn start_over(&mut self) {
        self.state = QuizState::Idle { error: None };
    }

    fn finish(&mut self, session: QuizSession) {
        let total = session.total();
        let percent = score_percent(session.score, total);
        let topic = session.topic().to_string();
        let subject = catalog::resolve_subject_in(self.subjects, &topic);
        let saved = self
            .store
            .record_score(&subject, &topic, percent, ScoreKind::Quiz);
        logger::log(&format!(
            "Quiz finished: {}/{} ({}%) on {} / {}",
            session.score, total, percent, subject, topic
        ));
        self.state = QuizState::Finished(QuizResult {
            topic,
            subject,
            correct: session.score,
            total,
            percent,
            saved,
        });
    }
}

//! Scripted gateway for tests: each call pops the next queued reply.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::gateway::{ExplainRequest, Gateway, GradeRequest, SummarizeRequest};
use crate::error::GatewayError;
use crate::models::{GradingResult, QuizQuestion, QuizRequest};

type Queue<T> = Mutex<VecDeque<(Duration, Result<T, GatewayError>)>>;

#[derive(Default)]
pub struct ScriptedGateway {
    explain: Queue<String>,
    summarize: Queue<String>,
    quiz: Queue<Vec<QuizQuestion>>,
    theory: Queue<Vec<String>>,
    grade: Queue<GradingResult>,
    calls: AtomicUsize,
}

fn pop<T>(queue: &Queue<T>) -> (Duration, Result<T, GatewayError>) {
    queue
        .lock()
        .ok()
        .and_then(|mut q| q.pop_front())
        .unwrap_or((
            Duration::ZERO,
            Err(GatewayError::Provider("no scripted response".to_string())),
        ))
}

async fn reply<T>(queue: &Queue<T>) -> Result<T, GatewayError> {
    let (delay, result) = pop(queue);
    if !delay.is_zero() {
        sleep(delay).await;
    }
    result
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn push_explain(self, result: Result<String, GatewayError>) -> Self {
        self.explain.lock().unwrap().push_back((Duration::ZERO, result));
        self
    }

    pub fn push_summary(self, result: Result<String, GatewayError>) -> Self {
        self.summarize.lock().unwrap().push_back((Duration::ZERO, result));
        self
    }

    pub fn push_quiz(self, result: Result<Vec<QuizQuestion>, GatewayError>) -> Self {
        self.push_quiz_after(Duration::ZERO, result)
    }

    pub fn push_quiz_after(
        self,
        delay: Duration,
        result: Result<Vec<QuizQuestion>, GatewayError>,
    ) -> Self {
        self.quiz.lock().unwrap().push_back((delay, result));
        self
    }

    pub fn push_theory(self, result: Result<Vec<String>, GatewayError>) -> Self {
        self.theory.lock().unwrap().push_back((Duration::ZERO, result));
        self
    }

    pub fn push_grade(self, result: Result<GradingResult, GatewayError>) -> Self {
        self.push_grade_after(Duration::ZERO, result)
    }

    pub fn push_grade_after(
        self,
        delay: Duration,
        result: Result<GradingResult, GatewayError>,
    ) -> Self {
        self.grade.lock().unwrap().push_back((delay, result));
        self
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn explain(&self, _request: &ExplainRequest) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.explain).await
    }

    async fn summarize(&self, _request: &SummarizeRequest) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.summarize).await
    }

    async fn generate_quiz(
        &self,
        _request: &QuizRequest,
    ) -> Result<Vec<QuizQuestion>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.quiz).await
    }

    async fn generate_theory_questions(
        &self,
        _chapter: &str,
    ) -> Result<Vec<String>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.theory).await
    }

    async fn grade_theory_answers(
        &self,
        _request: &GradeRequest,
    ) -> Result<GradingResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.grade).await
    }
}

pub fn multiple_choice(question: &str, options: [&str; 4], answer: &str) -> QuizQuestion {
    QuizQuestion {
        question: question.to_string(),
        answer: answer.to_string(),
        options: Some(options.iter().map(|o| o.to_string()).collect()),
    }
}

pub fn fill_in_blank(question: &str, answer: &str) -> QuizQuestion {
    QuizQuestion {
        question: question.to_string(),
        answer: answer.to_string(),
        options: None,
    }
}

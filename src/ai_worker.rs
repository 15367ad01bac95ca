use crate::ai::{ExplainRequest, Gateway, GradeRequest, SummarizeRequest};
use crate::error::GatewayError;
use crate::logger;
use crate::models::{GradingResult, QuizQuestion, QuizRequest};
use crate::quiz::RequestToken;
use crossbeam_channel::{Receiver, Sender};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum GatewayCall {
    Explain(ExplainRequest),
    Summarize(SummarizeRequest),
    Quiz(QuizRequest),
    TheoryQuestions(String),
    Grade(GradeRequest),
}

impl GatewayCall {
    /// The result this call would carry had it failed with `error`.
    pub fn failed(&self, error: GatewayError) -> GatewayResult {
        match self {
            GatewayCall::Explain(_) => GatewayResult::Explain(Err(error)),
            GatewayCall::Summarize(_) => GatewayResult::Summarize(Err(error)),
            GatewayCall::Quiz(_) => GatewayResult::Quiz(Err(error)),
            GatewayCall::TheoryQuestions(_) => GatewayResult::TheoryQuestions(Err(error)),
            GatewayCall::Grade(_) => GatewayResult::Grade(Err(error)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GatewayCall::Explain(_) => "explain",
            GatewayCall::Summarize(_) => "summarize",
            GatewayCall::Quiz(_) => "quiz",
            GatewayCall::TheoryQuestions(_) => "theory questions",
            GatewayCall::Grade(_) => "grade",
        }
    }
}

/// The outcome of one call, tagged with the flow it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult {
    Explain(Result<String, GatewayError>),
    Summarize(Result<String, GatewayError>),
    Quiz(Result<Vec<QuizQuestion>, GatewayError>),
    TheoryQuestions(Result<Vec<String>, GatewayError>),
    Grade(Result<GradingResult, GatewayError>),
}

#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub token: RequestToken,
    pub call: GatewayCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub token: RequestToken,
    pub result: GatewayResult,
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(GatewayError::Timeout(limit)))
}

async fn run_call(gateway: &dyn Gateway, call: GatewayCall, limit: Duration) -> GatewayResult {
    match call {
        GatewayCall::Explain(request) => {
            GatewayResult::Explain(bounded(limit, gateway.explain(&request)).await)
        }
        GatewayCall::Summarize(request) => {
            GatewayResult::Summarize(bounded(limit, gateway.summarize(&request)).await)
        }
        GatewayCall::Quiz(request) => {
            GatewayResult::Quiz(bounded(limit, gateway.generate_quiz(&request)).await)
        }
        GatewayCall::TheoryQuestions(chapter) => GatewayResult::TheoryQuestions(
            bounded(limit, gateway.generate_theory_questions(&chapter)).await,
        ),
        GatewayCall::Grade(request) => {
            GatewayResult::Grade(bounded(limit, gateway.grade_theory_answers(&request)).await)
        }
    }
}

/// Run gateway calls off the UI thread. Each request is served concurrently
/// and answered on `reply_tx`; the worker exits when `request_rx` disconnects.
pub fn spawn_gateway_worker(
    gateway: Arc<dyn Gateway>,
    timeout: Duration,
    reply_tx: Sender<GatewayReply>,
    request_rx: Receiver<GatewayRequest>,
) -> io::Result<thread::JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("aicademy::gateway_worker".to_string())
        .spawn(move || {
            while let Ok(GatewayRequest { token, call }) = request_rx.recv() {
                logger::log(&format!(
                    "Worker received {} request {:?}",
                    call.name(),
                    token
                ));
                let gateway = Arc::clone(&gateway);
                let reply_tx = reply_tx.clone();
                rt.spawn(async move {
                    let result = run_call(gateway.as_ref(), call, timeout).await;
                    if reply_tx.send(GatewayReply { token, result }).is_err() {
                        logger::log("Reply channel closed, dropping gateway result");
                    }
                });
            }
            logger::log("Worker channel disconnected, exiting");
            rt.shutdown_background();
        })
}

//! Ask and summarize tools: a single-request tracker and the saved summaries list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::logger;
use crate::quiz::RequestToken;
use crate::store::{ProgressStore, SUMMARIES_KEY};

pub const SUMMARY_LOG_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSummary {
    pub id: String,
    pub original: String,
    pub summary: String,
    pub timestamp: String,
}

/// Most recent summaries, newest first.
#[derive(Debug, Clone)]
pub struct SummaryLog {
    store: ProgressStore,
}

impl SummaryLog {
    pub fn new(store: ProgressStore) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Vec<StoredSummary> {
        self.store.read_record(SUMMARIES_KEY)
    }

    pub fn push(&self, original: &str, summary: &str) -> Vec<StoredSummary> {
        self.push_at(original, summary, Utc::now())
    }

    /// Prepend a summary and keep the newest [`SUMMARY_LOG_CAP`]. Returns the
    /// list as it should be displayed, even if saving failed.
    pub fn push_at(&self, original: &str, summary: &str, at: DateTime<Utc>) -> Vec<StoredSummary> {
        let mut entries = self.entries();
        entries.insert(
            0,
            StoredSummary {
                id: at.to_rfc3339(),
                original: original.to_string(),
                summary: summary.to_string(),
                timestamp: at.format("%Y-%m-%d %H:%M").to_string(),
            },
        );
        entries.truncate(SUMMARY_LOG_CAP);
        if !self.store.write_record(SUMMARIES_KEY, &entries) {
            logger::warn("Summary shown but not saved");
        }
        entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskState<T> {
    Idle,
    Pending(RequestToken),
    Done(T),
    Failed(String),
}

/// One outstanding gateway call at a time; a newer call supersedes older ones.
#[derive(Debug)]
pub struct AssistantTask<T> {
    state: TaskState<T>,
}

impl<T> Default for AssistantTask<T> {
    fn default() -> Self {
        Self {
            state: TaskState::Idle,
        }
    }
}

impl<T> AssistantTask<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TaskState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TaskState::Pending(_))
    }

    pub fn begin(&mut self) -> RequestToken {
        let token = RequestToken::issue();
        self.state = TaskState::Pending(token);
        token
    }

    /// Returns `false` when the reply is stale and was dropped.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<T, GatewayError>,
        failure_message: &str,
    ) -> bool {
        if !matches!(self.state, TaskState::Pending(t) if t == token) {
            return false;
        }
        self.state = match result {
            Ok(value) => TaskState::Done(value),
            Err(e) => {
                logger::error(&format!("{}: {}", failure_message, e));
                TaskState::Failed(failure_message.to_string())
            }
        };
        true
    }

    /// Show a value without a gateway call, e.g. a summary loaded from history.
    pub fn show(&mut self, value: T) {
        self.state = TaskState::Done(value);
    }

    pub fn reset(&mut self) {
        self.state = TaskState::Idle;
    }
}

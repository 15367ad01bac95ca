//! Error types shared across the crate.

use std::time::Duration;

use thiserror::Error;

/// Failures of the AI capability. Always recoverable by retrying.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("AI provider error: {0}")]
    Provider(String),
    #[error("AI returned an unusable response: {0}")]
    MalformedResponse(String),
    #[error("AI request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("AI worker is not running")]
    Unavailable,
}

/// User input rejected before any gateway call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("Topic must be at least {min} characters long.")]
    TopicTooShort { min: usize },
    #[error("Number of questions must be between {min} and {max}.")]
    QuestionCountOutOfRange { min: usize, max: usize },
    #[error("Your question must be at least {min} characters long.")]
    QuestionTooShort { min: usize },
    #[error("Course material must be at least {min} characters long.")]
    CourseMaterialTooShort { min: usize },
    #[error("Text to summarize must be at least {min} characters long.")]
    TextTooShort { min: usize },
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("answer cannot be empty")]
    EmptyAnswer,
    #[error("answer must be one of the listed options")]
    UnknownOption,
}

/// Failures of the persistent backend. Never surfaced past `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Migration(#[from] refinery::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A transition was requested that the current session state does not accept.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no question is waiting for an answer")]
    NotPresenting,
    #[error("the current question has not been answered yet")]
    NotAnswered,
    #[error("the session is already finished")]
    Finished,
    #[error("no chapter was selected for this exam")]
    NoChapter,
    #[error("questions are not ready for upload yet")]
    NotAwaitingUpload,
    #[error("select a photo of your answers first")]
    NoImageSelected,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_facing() {
        let err = ValidationError::TopicTooShort { min: 3 };
        assert_eq!(err.to_string(), "Topic must be at least 3 characters long.");

        let err = ValidationError::QuestionCountOutOfRange { min: 1, max: 20 };
        assert_eq!(
            err.to_string(),
            "Number of questions must be between 1 and 20."
        );
    }

    #[test]
    fn test_session_error_wraps_validation() {
        let err: SessionError = ValidationError::EmptyAnswer.into();
        assert_eq!(err, SessionError::Validation(ValidationError::EmptyAnswer));
        assert_eq!(err.to_string(), "answer cannot be empty");
    }

    #[test]
    fn test_timeout_message() {
        let err = GatewayError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "AI request timed out after 60s");
    }
}

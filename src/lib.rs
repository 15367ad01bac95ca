pub mod aggregator;
pub mod ai;
pub mod ai_worker;
pub mod app;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod quiz;
pub mod store;
pub mod theory;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod ui_tests;

// Re-exports for convenience
pub use ai::{ExplainRequest, Gateway, GradeRequest, OpenRouterGateway, SummarizeRequest};
pub use app::App;
pub use config::AppConfig;
pub use error::{GatewayError, SessionError, StorageError, ValidationError};
pub use models::{AppState, QuizMode, QuizQuestion, QuizRequest};
pub use quiz::{QuizMachine, QuizState, RequestToken};
pub use store::ProgressStore;
pub use theory::{TheoryMachine, TheoryState};

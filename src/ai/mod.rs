pub mod client;
pub mod flows;
pub mod gateway;

#[cfg(test)]
pub mod mock;

// Public API exports
pub use client::{DEFAULT_MODEL, ModelConfig, OpenRouterClient, VisionClient};
pub use gateway::{ExplainRequest, Gateway, GradeRequest, OpenRouterGateway, SummarizeRequest};

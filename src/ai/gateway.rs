use async_trait::async_trait;

use crate::ai::client::{ModelConfig, OpenRouterClient, VisionClient};
use crate::ai::flows;
use crate::config::AppConfig;
use crate::error::{GatewayError, ValidationError};
use crate::logger;
use crate::models::{GradingResult, ImageBlob, QuizQuestion, QuizRequest};

pub const MIN_QUESTION_LEN: usize = 10;
pub const MIN_COURSE_MATERIAL_LEN: usize = 3;
pub const MIN_SUMMARY_TEXT_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainRequest {
    pub question: String,
    pub course_material: String,
}

impl ExplainRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.course_material.trim().chars().count() < MIN_COURSE_MATERIAL_LEN {
            return Err(ValidationError::CourseMaterialTooShort {
                min: MIN_COURSE_MATERIAL_LEN,
            });
        }
        if self.question.trim().chars().count() < MIN_QUESTION_LEN {
            return Err(ValidationError::QuestionTooShort {
                min: MIN_QUESTION_LEN,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    pub text: String,
}

impl SummarizeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.chars().count() < MIN_SUMMARY_TEXT_LEN {
            return Err(ValidationError::TextTooShort {
                min: MIN_SUMMARY_TEXT_LEN,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRequest {
    pub image: ImageBlob,
    pub questions: Vec<String>,
}

/// The AI capability boundary. Every call either yields a typed result or fails.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn explain(&self, request: &ExplainRequest) -> Result<String, GatewayError>;

    async fn summarize(&self, request: &SummarizeRequest) -> Result<String, GatewayError>;

    async fn generate_quiz(&self, request: &QuizRequest)
    -> Result<Vec<QuizQuestion>, GatewayError>;

    async fn generate_theory_questions(&self, chapter: &str) -> Result<Vec<String>, GatewayError>;

    async fn grade_theory_answers(
        &self,
        request: &GradeRequest,
    ) -> Result<GradingResult, GatewayError>;
}

/// Gateway backed by OpenRouter models.
pub struct OpenRouterGateway {
    text: Result<OpenRouterClient, String>,
    vision: VisionClient,
    model: ModelConfig,
    vision_model: String,
}

impl OpenRouterGateway {
    pub fn new(config: &AppConfig) -> Self {
        let text = OpenRouterClient::new(config.api_key.as_deref(), &config.api_base_url());
        if let Err(e) = &text {
            logger::warn(e);
        }
        Self {
            text,
            vision: VisionClient::new(config.base_url.clone(), config.api_key.clone()),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let client = self
            .text
            .as_ref()
            .map_err(|e| GatewayError::Provider(e.clone()))?;
        let response = client
            .complete(flows::TUTOR_SYSTEM, prompt, &self.model)
            .await?;
        logger::log(&format!("Raw AI response: {}", response));
        Ok(response)
    }
}

#[async_trait]
impl Gateway for OpenRouterGateway {
    async fn explain(&self, request: &ExplainRequest) -> Result<String, GatewayError> {
        let response = self.complete(&flows::explain_prompt(request)).await?;
        flows::parse_explain(&response)
    }

    async fn summarize(&self, request: &SummarizeRequest) -> Result<String, GatewayError> {
        let response = self.complete(&flows::summarize_prompt(request)).await?;
        flows::parse_summary(&response)
    }

    async fn generate_quiz(
        &self,
        request: &QuizRequest,
    ) -> Result<Vec<QuizQuestion>, GatewayError> {
        let response = self.complete(&flows::quiz_prompt(request)).await?;
        flows::parse_quiz(&response, request.mode)
    }

    async fn generate_theory_questions(&self, chapter: &str) -> Result<Vec<String>, GatewayError> {
        let response = self
            .complete(&flows::theory_questions_prompt(chapter))
            .await?;
        flows::parse_theory_questions(&response)
    }

    async fn grade_theory_answers(
        &self,
        request: &GradeRequest,
    ) -> Result<GradingResult, GatewayError> {
        let response = self
            .vision
            .complete_with_image(
                &self.vision_model,
                &flows::grading_prompt(request),
                &request.image.data_uri(),
            )
            .await?;
        logger::log(&format!("Raw grading response: {}", response));
        flows::parse_grading(&response)
    }
}

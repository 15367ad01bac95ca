use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_TOPIC_LEN: usize = 3;
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 20;
pub const DEFAULT_QUESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Which question schema a quiz uses. Travels with the request so the
/// generator and the session always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    #[default]
    MultipleChoice,
    FillInTheBlank,
}

impl QuizMode {
    pub fn label(&self) -> &'static str {
        match self {
            QuizMode::MultipleChoice => "Multiple choice",
            QuizMode::FillInTheBlank => "Fill in the blank",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            QuizMode::MultipleChoice => QuizMode::FillInTheBlank,
            QuizMode::FillInTheBlank => QuizMode::MultipleChoice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub topic: String,
    pub number_of_questions: usize,
    pub difficulty: Difficulty,
    pub mode: QuizMode,
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self {
            topic: String::new(),
            number_of_questions: DEFAULT_QUESTIONS,
            difficulty: Difficulty::Medium,
            mode: QuizMode::MultipleChoice,
        }
    }
}

impl QuizRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().chars().count() < MIN_TOPIC_LEN {
            return Err(ValidationError::TopicTooShort { min: MIN_TOPIC_LEN });
        }
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.number_of_questions) {
            return Err(ValidationError::QuestionCountOutOfRange {
                min: MIN_QUESTIONS,
                max: MAX_QUESTIONS,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    Quiz,
    Theory,
}

impl ScoreKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreKind::Quiz => "Quiz",
            ScoreKind::Theory => "Theory exam",
        }
    }
}

/// Latest known scores for one chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory_exam_score: Option<u8>,
}

impl ChapterProgress {
    pub fn has_any_score(&self) -> bool {
        self.quiz_score.is_some() || self.theory_exam_score.is_some()
    }

    pub fn set(&mut self, kind: ScoreKind, score: u8) {
        match kind {
            ScoreKind::Quiz => self.quiz_score = Some(score),
            ScoreKind::Theory => self.theory_exam_score = Some(score),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProgress {
    #[serde(default)]
    pub chapters: BTreeMap<String, ChapterProgress>,
}

/// Subject name to per-chapter progress.
pub type ProgressMap = BTreeMap<String, SubjectProgress>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub chapter: String,
    pub score: u8,
    #[serde(rename = "type")]
    pub kind: ScoreKind,
}

/// Uploaded answer-sheet photo. Opaque to the core.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        };
        Ok(Self::new(bytes, mime_type))
    }

    /// `data:<mime>;base64,<payload>` form expected by vision models.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    pub feedback: String,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    QuizSetup,
    Quiz,
    TheoryPicker,
    Theory,
    Ask,
    Summarize,
    Dashboard,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, count: usize) -> QuizRequest {
        QuizRequest {
            topic: topic.to_string(),
            number_of_questions: count,
            ..QuizRequest::default()
        }
    }

    #[test]
    fn test_quiz_request_validation() {
        assert!(request("Photosynthesis", 5).validate().is_ok());
        assert!(request("Photosynthesis", 1).validate().is_ok());
        assert!(request("Photosynthesis", 20).validate().is_ok());
        assert_eq!(
            request("  ab  ", 5).validate(),
            Err(ValidationError::TopicTooShort { min: 3 })
        );
        assert_eq!(
            request("Algebra", 0).validate(),
            Err(ValidationError::QuestionCountOutOfRange { min: 1, max: 20 })
        );
        assert!(request("Algebra", 21).validate().is_err());
    }

    #[test]
    fn test_difficulty_parse_and_cycle() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn test_chapter_progress_json_shape() {
        let mut progress = ChapterProgress::default();
        progress.set(ScoreKind::Quiz, 80);
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(json, r#"{"quizScore":80}"#);

        let parsed: ChapterProgress =
            serde_json::from_str(r#"{"theoryExamScore":55}"#).unwrap();
        assert_eq!(parsed.theory_exam_score, Some(55));
        assert!(parsed.quiz_score.is_none());
        assert!(parsed.has_any_score());
        assert!(!ChapterProgress::default().has_any_score());
    }

    #[test]
    fn test_history_entry_uses_browser_field_names() {
        let json = r#"{"date":"2024-03-05T10:00:00Z","subject":"Science","chapter":"Photosynthesis","score":90,"type":"theory"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, ScoreKind::Theory);
        assert_eq!(entry.score, 90);
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["type"], "theory");
        assert!(back.get("date").is_some());
    }

    #[test]
    fn test_image_data_uri() {
        let blob = ImageBlob::new(vec![0xff, 0xd8, 0xff], "image/jpeg");
        assert_eq!(blob.data_uri(), "data:image/jpeg;base64,/9j/");
        assert!(format!("{:?}", blob).contains("bytes: 3"));
    }

    #[test]
    fn test_image_from_path_detects_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.PNG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        let blob = ImageBlob::from_path(&path).unwrap();
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.bytes, vec![1, 2, 3]);
    }
}

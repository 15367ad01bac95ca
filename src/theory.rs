//! Theory exam session: fetch open questions for a chapter, take one photo
//! of the handwritten answers and have it graded.
//!
//! `Idle -> Generating -> AwaitingUpload -> Grading -> Graded`

use crate::ai::{Gateway, GradeRequest};
use crate::catalog::{self, SUBJECTS, Subject};
use crate::error::{GatewayError, SessionError};
use crate::logger;
use crate::models::{GradingResult, ImageBlob, ScoreKind};
use crate::quiz::RequestToken;
use crate::store::ProgressStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryState {
    Idle,
    Generating {
        token: RequestToken,
    },
    AwaitingUpload {
        questions: Vec<String>,
        image: Option<ImageBlob>,
    },
    Grading {
        token: RequestToken,
        questions: Vec<String>,
        image: ImageBlob,
    },
    Graded {
        questions: Vec<String>,
        result: GradingResult,
        saved: bool,
    },
}

impl TheoryState {
    pub fn name(&self) -> &'static str {
        match self {
            TheoryState::Idle => "idle",
            TheoryState::Generating { .. } => "generating",
            TheoryState::AwaitingUpload { .. } => "awaiting-upload",
            TheoryState::Grading { .. } => "grading",
            TheoryState::Graded { .. } => "graded",
        }
    }

    pub fn questions(&self) -> &[String] {
        match self {
            TheoryState::AwaitingUpload { questions, .. }
            | TheoryState::Grading { questions, .. }
            | TheoryState::Graded { questions, .. } => questions,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub struct TheoryMachine {
    chapter: Option<String>,
    state: TheoryState,
    error: Option<String>,
    store: ProgressStore,
    subjects: &'static [Subject],
}

impl TheoryMachine {
    /// Without a chapter the exam only renders a notice and never calls the gateway.
    pub fn new(chapter: Option<String>, store: ProgressStore) -> Self {
        Self::with_subjects(chapter, store, SUBJECTS)
    }

    pub fn with_subjects(
        chapter: Option<String>,
        store: ProgressStore,
        subjects: &'static [Subject],
    ) -> Self {
        let chapter = chapter
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Self {
            chapter,
            state: TheoryState::Idle,
            error: None,
            store,
            subjects,
        }
    }

    pub fn chapter(&self) -> Option<&str> {
        self.chapter.as_deref()
    }

    pub fn subject(&self) -> Option<String> {
        self.chapter
            .as_deref()
            .map(|c| catalog::resolve_subject_in(self.subjects, c))
    }

    pub fn state(&self) -> &TheoryState {
        &self.state
    }

    /// Last user-visible failure, cleared by the next transition.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_image(&self) -> Option<&ImageBlob> {
        match &self.state {
            TheoryState::AwaitingUpload { image, .. } => image.as_ref(),
            TheoryState::Grading { image, .. } => Some(image),
            _ => None,
        }
    }

    /// Enter `Generating` for the chapter. Any earlier questions, image,
    /// result or in-flight request are discarded.
    pub fn request_questions(&mut self) -> Result<(RequestToken, String), SessionError> {
        let Some(chapter) = self.chapter.clone() else {
            return Err(SessionError::NoChapter);
        };
        let token = RequestToken::issue();
        logger::log(&format!(
            "Requesting theory questions {:?} for {}",
            token, chapter
        ));
        self.error = None;
        self.state = TheoryState::Generating { token };
        Ok((token, chapter))
    }

    pub fn restart(&mut self) -> Result<(RequestToken, String), SessionError> {
        self.request_questions()
    }

    /// Returns `false` when the reply is stale and was dropped.
    pub fn resolve_questions(
        &mut self,
        token: RequestToken,
        result: Result<Vec<String>, GatewayError>,
    ) -> bool {
        if !matches!(&self.state, TheoryState::Generating { token: t } if *t == token) {
            logger::log(&format!("Dropping stale theory questions {:?}", token));
            return false;
        }
        match result {
            Ok(questions) if !questions.is_empty() => {
                self.state = TheoryState::AwaitingUpload {
                    questions,
                    image: None,
                };
            }
            Ok(_) => {
                logger::error("Theory question generation returned no questions");
                self.fail_generation();
            }
            Err(e) => {
                logger::error(&format!("Theory question generation failed: {}", e));
                self.fail_generation();
            }
        }
        true
    }

    fn fail_generation(&mut self) {
        self.state = TheoryState::Idle;
        self.error = Some("Failed to generate theory questions. Please try again.".to_string());
    }

    /// Replace the selected answer sheet. Stays in `AwaitingUpload`.
    pub fn select_image(&mut self, blob: ImageBlob) -> Result<(), SessionError> {
        let TheoryState::AwaitingUpload { image, .. } = &mut self.state else {
            return Err(SessionError::NotAwaitingUpload);
        };
        *image = Some(blob);
        self.error = None;
        Ok(())
    }

    pub fn begin_grading(&mut self) -> Result<(RequestToken, GradeRequest), SessionError> {
        match &self.state {
            TheoryState::AwaitingUpload { image: Some(_), .. } => {}
            TheoryState::AwaitingUpload { image: None, .. } => {
                return Err(SessionError::NoImageSelected);
            }
            _ => return Err(SessionError::NotAwaitingUpload),
        }
        let TheoryState::AwaitingUpload {
            questions,
            image: Some(image),
        } = std::mem::replace(&mut self.state, TheoryState::Idle)
        else {
            return Err(SessionError::NotAwaitingUpload);
        };

        let token = RequestToken::issue();
        let request = GradeRequest {
            image: image.clone(),
            questions: questions.clone(),
        };
        logger::log(&format!(
            "Submitting theory answers {:?} ({} bytes, {})",
            token,
            image.bytes.len(),
            image.mime_type
        ));
        self.error = None;
        self.state = TheoryState::Grading {
            token,
            questions,
            image,
        };
        Ok((token, request))
    }

    /// Returns `false` when the reply is stale and was dropped.
    pub fn resolve_grading(
        &mut self,
        token: RequestToken,
        result: Result<GradingResult, GatewayError>,
    ) -> bool {
        if !matches!(&self.state, TheoryState::Grading { token: t, .. } if *t == token) {
            logger::log(&format!("Dropping stale grading result {:?}", token));
            return false;
        }
        let TheoryState::Grading {
            questions, image, ..
        } = std::mem::replace(&mut self.state, TheoryState::Idle)
        else {
            return false;
        };

        match result {
            Ok(result) => {
                let saved = self.persist(result.score);
                self.state = TheoryState::Graded {
                    questions,
                    result,
                    saved,
                };
            }
            Err(e) => {
                logger::error(&format!("Theory grading failed: {}", e));
                self.error = Some("Failed to grade your answers. Please try again.".to_string());
                self.state = TheoryState::AwaitingUpload {
                    questions,
                    image: Some(image),
                };
            }
        }
        true
    }

    fn persist(&self, score: u8) -> bool {
        let (Some(chapter), Some(subject)) = (self.chapter.as_deref(), self.subject()) else {
            return false;
        };
        logger::log(&format!(
            "Theory exam graded: {}% on {} / {}",
            score, subject, chapter
        ));
        self.store
            .record_score(&subject, chapter, score, ScoreKind::Theory)
    }

    /// Request and resolve the questions in one step against `gateway`.
    pub async fn generate(&mut self, gateway: &dyn Gateway) -> Result<bool, SessionError> {
        let (token, chapter) = self.request_questions()?;
        let result = gateway.generate_theory_questions(&chapter).await;
        Ok(self.resolve_questions(token, result))
    }

    /// Submit the selected image and resolve the grade in one step.
    pub async fn grade(&mut self, gateway: &dyn Gateway) -> Result<bool, SessionError> {
        let (token, request) = self.begin_grading()?;
        let result = gateway.grade_theory_answers(&request).await;
        Ok(self.resolve_grading(token, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::ScriptedGateway;
    use crate::store::MemoryBackend;
    use std::sync::Arc;

    fn store() -> ProgressStore {
        ProgressStore::new(Arc::new(MemoryBackend::default()))
    }

    fn questions() -> Vec<String> {
        vec![
            "Define a derivative.".to_string(),
            "State the chain rule.".to_string(),
            "Differentiate x^2.".to_string(),
        ]
    }

    fn photo(tag: u8) -> ImageBlob {
        ImageBlob::new(vec![tag; 8], "image/png")
    }

    fn awaiting(store: ProgressStore) -> TheoryMachine {
        let mut machine = TheoryMachine::new(Some("Introduction to Calculus".to_string()), store);
        let (token, _) = machine.request_questions().unwrap();
        assert!(machine.resolve_questions(token, Ok(questions())));
        machine
    }

    fn graded(feedback: &str, score: u8) -> GradingResult {
        GradingResult {
            feedback: feedback.to_string(),
            score,
        }
    }

    #[test]
    fn test_missing_chapter_is_display_only() {
        let mut machine = TheoryMachine::new(None, store());
        assert_eq!(machine.request_questions(), Err(SessionError::NoChapter));
        assert_eq!(machine.state(), &TheoryState::Idle);

        let blank = TheoryMachine::new(Some("  ".to_string()), store());
        assert!(blank.chapter().is_none());
    }

    #[test]
    fn test_questions_keep_order() {
        let machine = awaiting(store());
        assert_eq!(machine.state().name(), "awaiting-upload");
        assert_eq!(machine.state().questions(), questions().as_slice());
        assert_eq!(machine.subject().as_deref(), Some("Mathematics"));
    }

    #[test]
    fn test_generation_failure_leaves_no_questions() {
        let mut machine = TheoryMachine::new(Some("Introduction to Calculus".to_string()), store());
        let (token, _) = machine.request_questions().unwrap();
        machine.resolve_questions(token, Err(GatewayError::Timeout(std::time::Duration::from_secs(60))));

        assert_eq!(machine.state(), &TheoryState::Idle);
        assert!(machine.state().questions().is_empty());
        assert!(machine.error().is_some());

        let (token, _) = machine.restart().unwrap();
        assert!(machine.error().is_none());
        assert!(machine.resolve_questions(token, Ok(questions())));
    }

    #[test]
    fn test_select_image_replaces_prior_selection() {
        let mut machine = awaiting(store());
        machine.select_image(photo(1)).unwrap();
        machine.select_image(photo(2)).unwrap();

        assert_eq!(machine.state().name(), "awaiting-upload");
        assert_eq!(machine.selected_image(), Some(&photo(2)));
    }

    #[test]
    fn test_grading_requires_image() {
        let mut machine = awaiting(store());
        assert_eq!(
            machine.begin_grading().unwrap_err(),
            SessionError::NoImageSelected
        );

        let mut idle = TheoryMachine::new(Some("Introduction to Calculus".to_string()), store());
        assert_eq!(
            idle.begin_grading().unwrap_err(),
            SessionError::NotAwaitingUpload
        );
        assert_eq!(
            idle.select_image(photo(1)).unwrap_err(),
            SessionError::NotAwaitingUpload
        );
    }

    #[test]
    fn test_grading_request_carries_image_and_questions() {
        let mut machine = awaiting(store());
        machine.select_image(photo(7)).unwrap();
        let (_, request) = machine.begin_grading().unwrap();

        assert_eq!(request.image, photo(7));
        assert_eq!(request.questions, questions());
        assert_eq!(machine.state().name(), "grading");
    }

    #[test]
    fn test_grading_failure_keeps_image() {
        let store = store();
        let mut machine = awaiting(store.clone());
        machine.select_image(photo(3)).unwrap();
        let (token, _) = machine.begin_grading().unwrap();
        machine.resolve_grading(token, Err(GatewayError::Provider("503".to_string())));

        assert_eq!(machine.state().name(), "awaiting-upload");
        assert_eq!(machine.selected_image(), Some(&photo(3)));
        assert!(machine.error().is_some());
        assert!(store.read_history().is_empty());
    }

    #[test]
    fn test_graded_persists_theory_score_once() {
        let store = store();
        let mut machine = awaiting(store.clone());
        machine.select_image(photo(1)).unwrap();
        let (token, _) = machine.begin_grading().unwrap();
        assert!(machine.resolve_grading(token, Ok(graded("Solid work.", 85))));
        assert!(!machine.resolve_grading(token, Ok(graded("Again", 10))));

        let TheoryState::Graded { result, saved, .. } = machine.state() else {
            panic!("expected graded");
        };
        assert_eq!(result.score, 85);
        assert!(saved);

        let history = store.read_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, ScoreKind::Theory);
        assert_eq!(
            store.read_progress()["Mathematics"].chapters["Introduction to Calculus"].theory_exam_score,
            Some(85)
        );
    }

    #[test]
    fn test_restart_discards_everything() {
        let mut machine = awaiting(store());
        machine.select_image(photo(1)).unwrap();
        let (grading, _) = machine.begin_grading().unwrap();

        let (fresh, chapter) = machine.restart().unwrap();
        assert_eq!(chapter, "Introduction to Calculus");
        assert!(!machine.resolve_grading(grading, Ok(graded("late", 50))));
        assert_eq!(machine.state(), &TheoryState::Generating { token: fresh });
        assert!(machine.selected_image().is_none());
    }

    #[test]
    fn test_stale_questions_are_dropped() {
        let mut machine = TheoryMachine::new(Some("Genetics".to_string()), store());
        let (first, _) = machine.request_questions().unwrap();
        let (second, _) = machine.restart().unwrap();

        assert!(machine.resolve_questions(second, Ok(vec!["New?".to_string()])));
        assert!(!machine.resolve_questions(first, Ok(questions())));
        assert_eq!(machine.state().questions(), ["New?".to_string()]);
    }

    #[tokio::test]
    async fn test_full_exam_through_gateway() {
        let gateway = ScriptedGateway::new()
            .push_theory(Ok(questions()))
            .push_grade(Ok(graded("Good", 70)));
        let store = store();
        let mut machine = TheoryMachine::new(Some("The Renaissance".to_string()), store.clone());

        assert!(machine.generate(&gateway).await.unwrap());
        machine.select_image(photo(9)).unwrap();
        assert!(machine.grade(&gateway).await.unwrap());

        assert_eq!(machine.state().name(), "graded");
        assert_eq!(gateway.calls(), 2);
        assert_eq!(store.read_history()[0].subject, "History");
    }
}

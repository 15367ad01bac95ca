//! Prompt templates and response parsing for each AI capability.

use serde::Deserialize;

use crate::ai::gateway::{ExplainRequest, GradeRequest, SummarizeRequest};
use crate::error::GatewayError;
use crate::models::{GradingResult, QuizMode, QuizQuestion, QuizRequest};

pub const BLANK_PLACEHOLDER: &str = "[BLANK]";
pub const MULTIPLE_CHOICE_OPTIONS: usize = 4;

pub const TUTOR_SYSTEM: &str =
    "You are an educational assistant for students. Respond ONLY with valid JSON.";

pub(crate) fn clean_json_response(response: &str) -> String {
    let mut cleaned = response.trim().to_string();

    if cleaned.starts_with("```") {
        let lines: Vec<&str> = cleaned.lines().collect();
        if lines.len() > 2 {
            cleaned = lines[1..lines.len() - 1].join("\n");
        }
    }

    if let Some(start) = cleaned.find('{')
        && let Some(end) = cleaned.rfind('}')
    {
        cleaned = cleaned[start..=end].to_string();
    }

    cleaned.trim().to_string()
}

fn parse_json<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T, GatewayError> {
    let cleaned = clean_json_response(response);
    serde_json::from_str(&cleaned).map_err(|e| {
        GatewayError::MalformedResponse(format!(
            "{}\nRaw: {}\nCleaned: {}",
            e, response, cleaned
        ))
    })
}

pub fn explain_prompt(request: &ExplainRequest) -> String {
    format!(
        r#"You are a teaching assistant. Answer the following question about the provided course material. If the answer is not explicitly present in the material, answer to the best of your knowledge.

Course Material:
{}

Question: {}

Respond ONLY with this exact JSON structure (no markdown fences, no extra text):
{{"answer": "your answer, markdown allowed"}}
"#,
        request.course_material, request.question
    )
}

pub fn summarize_prompt(request: &SummarizeRequest) -> String {
    format!(
        r#"Summarize the following content for a student. Keep the key ideas, definitions and conclusions.

Content:
{}

Respond ONLY with this exact JSON structure (no markdown fences, no extra text):
{{"summary": "the summary, markdown allowed"}}
"#,
        request.text
    )
}

pub fn quiz_prompt(request: &QuizRequest) -> String {
    match request.mode {
        QuizMode::MultipleChoice => format!(
            r#"You are an expert educator creating multiple-choice quizzes for students.

Generate a quiz with {} questions on the topic of {} with a difficulty of {}.

Each question must have exactly {} answer options, and "answer" must be copied exactly from one of the options.

Respond ONLY with this exact JSON structure (no markdown fences, no extra text):
{{
  "quiz": [
    {{
      "question": "What is the powerhouse of the cell?",
      "options": ["Nucleus", "Mitochondria", "Ribosome", "Golgi apparatus"],
      "answer": "Mitochondria"
    }}
  ]
}}
"#,
            request.number_of_questions,
            request.topic.trim(),
            request.difficulty,
            MULTIPLE_CHOICE_OPTIONS
        ),
        QuizMode::FillInTheBlank => format!(
            r#"You are an expert educator creating challenging "fill-in-the-blank" quizzes for students.

Generate a quiz with {} questions on the topic of {} with a difficulty of {}.

Each question must be a single sentence with a key term or concept replaced by the placeholder "{}".
The "answer" should be the word or short phrase that correctly fills the blank.

Respond ONLY with this exact JSON structure (no markdown fences, no extra text):
{{
  "quiz": [
    {{
      "question": "The powerhouse of the cell is the {}.",
      "answer": "mitochondria"
    }}
  ]
}}
"#,
            request.number_of_questions,
            request.topic.trim(),
            request.difficulty,
            BLANK_PLACEHOLDER,
            BLANK_PLACEHOLDER
        ),
    }
}

pub fn theory_questions_prompt(chapter: &str) -> String {
    format!(
        r#"You are an expert educator. Generate 4 short theory questions for a student on the topic of "{}". The questions should encourage critical thinking and not just rote memorization.

Respond ONLY with this exact JSON structure (no markdown fences, no extra text):
{{"questions": ["question 1", "question 2", "question 3", "question 4"]}}
"#,
        chapter
    )
}

pub fn grading_prompt(request: &GradeRequest) -> String {
    let questions: Vec<String> = request
        .questions
        .iter()
        .map(|q| format!("- {}", q))
        .collect();
    format!(
        r#"You are an expert examiner. A student has submitted a photo of their handwritten answers to a short theory exam.

Your task is to analyze the attached image, read the answers, and provide constructive feedback and a score.

Exam Questions:
{}

Please provide detailed, constructive feedback on the student's answers and a final score out of 100.

Respond ONLY with this exact JSON structure (no markdown fences, no extra text):
{{"feedback": "detailed feedback, markdown allowed", "score": number between 0 and 100}}
"#,
        questions.join("\n")
    )
}

#[derive(Debug, Deserialize)]
struct ExplainRaw {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct SummaryRaw {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct QuizRaw {
    quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
struct TheoryRaw {
    questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GradingRaw {
    feedback: String,
    score: f64,
}

pub fn parse_explain(response: &str) -> Result<String, GatewayError> {
    let raw: ExplainRaw = parse_json(response)?;
    Ok(raw.answer)
}

pub fn parse_summary(response: &str) -> Result<String, GatewayError> {
    let raw: SummaryRaw = parse_json(response)?;
    Ok(raw.summary)
}

/// Parse a generated quiz for the schema variant that was requested.
pub fn parse_quiz(response: &str, mode: QuizMode) -> Result<Vec<QuizQuestion>, GatewayError> {
    let raw: QuizRaw = parse_json(response)?;
    raw.quiz
        .into_iter()
        .enumerate()
        .map(|(i, mut q)| {
            q.question = q.question.trim().to_string();
            q.answer = q.answer.trim().to_string();
            match mode {
                QuizMode::MultipleChoice => {
                    let options: Vec<String> = q
                        .options
                        .take()
                        .unwrap_or_default()
                        .iter()
                        .map(|o| o.trim().to_string())
                        .collect();
                    if options.len() != MULTIPLE_CHOICE_OPTIONS {
                        return Err(GatewayError::MalformedResponse(format!(
                            "question {} has {} options, expected {}",
                            i + 1,
                            options.len(),
                            MULTIPLE_CHOICE_OPTIONS
                        )));
                    }
                    if !options.contains(&q.answer) {
                        return Err(GatewayError::MalformedResponse(format!(
                            "question {} answer is not one of its options",
                            i + 1
                        )));
                    }
                    q.options = Some(options);
                }
                QuizMode::FillInTheBlank => q.options = None,
            }
            Ok(q)
        })
        .collect()
}

pub fn parse_theory_questions(response: &str) -> Result<Vec<String>, GatewayError> {
    let raw: TheoryRaw = parse_json(response)?;
    let questions: Vec<String> = raw
        .questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    if questions.is_empty() {
        return Err(GatewayError::MalformedResponse(
            "no theory questions returned".to_string(),
        ));
    }
    Ok(questions)
}

pub fn parse_grading(response: &str) -> Result<GradingResult, GatewayError> {
    let raw: GradingRaw = parse_json(response)?;
    if !(0.0..=100.0).contains(&raw.score) {
        return Err(GatewayError::MalformedResponse(format!(
            "Invalid score: {}. Raw: {}",
            raw.score, response
        )));
    }
    Ok(GradingResult {
        feedback: raw.feedback,
        score: raw.score.round() as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[test]
    fn test_clean_json_response_simple() {
        let json = r#"{"answer":"yes"}"#;
        assert_eq!(clean_json_response(json), r#"{"answer":"yes"}"#);
    }

    #[test]
    fn test_clean_json_response_markdown() {
        let json = r#"```json
{"summary": "short"}
```"#;
        assert_eq!(clean_json_response(json), r#"{"summary": "short"}"#);
    }

    #[test]
    fn test_clean_json_response_with_text() {
        let json = r#"Here's your response: {"score": 90} thanks"#;
        assert_eq!(clean_json_response(json), r#"{"score": 90}"#);
    }

    #[test]
    fn test_quiz_prompt_follows_mode() {
        let mut request = QuizRequest {
            topic: "  Photosynthesis ".to_string(),
            number_of_questions: 7,
            difficulty: Difficulty::Hard,
            mode: QuizMode::FillInTheBlank,
        };
        let prompt = quiz_prompt(&request);
        assert!(prompt.contains("7 questions on the topic of Photosynthesis"));
        assert!(prompt.contains("difficulty of hard"));
        assert!(prompt.contains(BLANK_PLACEHOLDER));

        request.mode = QuizMode::MultipleChoice;
        let prompt = quiz_prompt(&request);
        assert!(prompt.contains("exactly 4 answer options"));
        assert!(!prompt.contains(BLANK_PLACEHOLDER));
    }

    #[test]
    fn test_parse_multiple_choice_quiz() {
        let json = r#"```json
{"quiz": [{"question": "Capital of Italy?", "options": ["Rome", "Milan", "Turin", "Naples"], "answer": " Rome "}]}
```"#;
        let quiz = parse_quiz(json, QuizMode::MultipleChoice).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].answer, "Rome");
        assert_eq!(quiz[0].options.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_parse_multiple_choice_trims_options() {
        let json = r#"{"quiz": [{"question": "Capital of the Roman Empire?", "options": [" Rome", "Carthage ", " Athens ", "Alexandria"], "answer": " Rome"}]}"#;
        let quiz = parse_quiz(json, QuizMode::MultipleChoice).unwrap();
        assert_eq!(quiz[0].answer, "Rome");
        assert_eq!(
            quiz[0].options.as_deref().unwrap(),
            ["Rome", "Carthage", "Athens", "Alexandria"]
        );
    }

    #[test]
    fn test_parse_multiple_choice_rejects_bad_options() {
        let three = r#"{"quiz": [{"question": "Q?", "options": ["a", "b", "c"], "answer": "a"}]}"#;
        assert!(matches!(
            parse_quiz(three, QuizMode::MultipleChoice),
            Err(GatewayError::MalformedResponse(_))
        ));

        let missing = r#"{"quiz": [{"question": "Q?", "options": ["a", "b", "c", "d"], "answer": "e"}]}"#;
        assert!(parse_quiz(missing, QuizMode::MultipleChoice).is_err());
    }

    #[test]
    fn test_parse_fill_in_blank_quiz_drops_options() {
        let json = r#"{"quiz": [
            {"question": "The powerhouse of the cell is the [BLANK].", "answer": "mitochondria"},
            {"question": "Plants make food by [BLANK].", "answer": "photosynthesis", "options": ["x"]}
        ]}"#;
        let quiz = parse_quiz(json, QuizMode::FillInTheBlank).unwrap();
        assert_eq!(quiz.len(), 2);
        assert!(quiz.iter().all(|q| q.options.is_none()));
    }

    #[test]
    fn test_parse_empty_quiz_is_allowed() {
        let quiz = parse_quiz(r#"{"quiz": []}"#, QuizMode::FillInTheBlank).unwrap();
        assert!(quiz.is_empty());
    }

    #[test]
    fn test_parse_theory_questions() {
        let json = r#"{"questions": ["Why?", "  ", "How?", "What if?"]}"#;
        let questions = parse_theory_questions(json).unwrap();
        assert_eq!(questions, vec!["Why?", "How?", "What if?"]);

        assert!(parse_theory_questions(r#"{"questions": []}"#).is_err());
    }

    #[test]
    fn test_parse_grading() {
        let result = parse_grading(r#"{"feedback": "Solid work.", "score": 87.6}"#).unwrap();
        assert_eq!(result.score, 88);
        assert_eq!(result.feedback, "Solid work.");
    }

    #[test]
    fn test_parse_grading_rejects_out_of_range_score() {
        assert!(parse_grading(r#"{"feedback": "x", "score": 120}"#).is_err());
        assert!(parse_grading(r#"{"feedback": "x", "score": -1}"#).is_err());
    }

    #[test]
    fn test_parse_explain_and_summary() {
        assert_eq!(parse_explain(r#"{"answer": "42"}"#).unwrap(), "42");
        assert_eq!(
            parse_summary("Sure! {\"summary\": \"Short.\"}").unwrap(),
            "Short."
        );
        assert!(parse_summary("no json here").is_err());
    }

    #[test]
    fn test_grading_prompt_lists_questions() {
        let request = GradeRequest {
            image: crate::models::ImageBlob::new(vec![1], "image/png"),
            questions: vec!["Define inertia.".to_string(), "State F=ma.".to_string()],
        };
        let prompt = grading_prompt(&request);
        assert!(prompt.contains("- Define inertia.\n- State F=ma."));
    }
}

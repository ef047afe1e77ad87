//! Time-blocking filter: unlock-question generation and the session preview.
//!
//! The stateful flow lives in [`crate::session`]; this module produces the
//! [`UnlockQuestion`] it stores and the answer-free [`StudyBriefing`] served
//! when the filter is applied directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Filter, FilterFuture, FilterKind, FilterOutput};
use crate::{GenerationError, Generator, coerce, prompts};

/// Verification question generated from study text.
///
/// `answer` is the ground truth for the unlock check and never crosses to
/// the client; [`StudyBriefing`] is the client-facing projection.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockQuestion {
    pub question: String,
    pub answer: String,
    pub session_tips: Vec<String>,
    pub recommended_duration: u32,
}

impl UnlockQuestion {
    /// Fixed placeholder used when the model's reply does not parse.
    pub fn fallback() -> Self {
        Self {
            question: "What is the main topic?".to_string(),
            answer: "The topic".to_string(),
            session_tips: vec![
                "Focus!".to_string(),
                "No phone!".to_string(),
                "Drink water.".to_string(),
            ],
            recommended_duration: 25,
        }
    }

    /// Project down to the client-facing payload, dropping the answer.
    pub fn briefing(self) -> StudyBriefing {
        StudyBriefing {
            question: self.question,
            session_tips: self.session_tips,
            recommended_duration: self.recommended_duration,
        }
    }
}

/// Answer-free preview of an unlock question.
#[derive(Debug, Clone, Serialize)]
pub struct StudyBriefing {
    pub question: String,
    pub session_tips: Vec<String>,
    pub recommended_duration: u32,
}

/// Generate an unlock question for `study_text`.
///
/// A reply that does not parse yields [`UnlockQuestion::fallback`]; only
/// generation failure itself is an error, so callers always get a question
/// once the model answered at all.
pub async fn generate_unlock_question(
    generator: &dyn Generator,
    study_text: &str,
) -> Result<UnlockQuestion, GenerationError> {
    let reply = generator.generate(&prompts::unlock_question(study_text)).await?;
    Ok(coerce::parse_reply(&reply).unwrap_or_else(UnlockQuestion::fallback))
}

/// The `grey` filter: previews a study session without starting one.
pub struct TimeBlockingFilter {
    generator: Arc<dyn Generator>,
}

impl TimeBlockingFilter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Filter for TimeBlockingFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::TimeBlocking
    }

    fn apply<'a>(&'a self, text: &'a str, _mode: &'a str) -> FilterFuture<'a> {
        Box::pin(async move {
            let quiz = generate_unlock_question(self.generator.as_ref(), text).await?;
            Ok(FilterOutput::TimeBlocking(quiz.briefing()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    const REPLY: &str = r#"```json
    {
        "question": "Which organelle produces ATP?",
        "answer": "The mitochondria",
        "session_tips": ["Take notes", "Read twice"],
        "recommended_duration": 40
    }
    ```"#;

    #[tokio::test]
    async fn parses_well_formed_reply() {
        let generator = ScriptedGenerator::replying(REPLY);
        let quiz = generate_unlock_question(&generator, "cell biology notes")
            .await
            .unwrap();
        assert_eq!(quiz.question, "Which organelle produces ATP?");
        assert_eq!(quiz.answer, "The mitochondria");
        assert_eq!(quiz.session_tips.len(), 2);
        assert_eq!(quiz.recommended_duration, 40);
    }

    #[tokio::test]
    async fn prompt_embeds_study_text() {
        let generator = ScriptedGenerator::replying(REPLY);
        generate_unlock_question(&generator, "the Krebs cycle")
            .await
            .unwrap();
        assert!(generator.prompts()[0].contains("the Krebs cycle"));
    }

    #[tokio::test]
    async fn garbage_reply_falls_back() {
        let generator = ScriptedGenerator::replying("I can't produce JSON, sorry.");
        let quiz = generate_unlock_question(&generator, "notes").await.unwrap();
        assert_eq!(quiz.question, "What is the main topic?");
        assert_eq!(quiz.answer, "The topic");
        assert_eq!(
            quiz.session_tips,
            vec!["Focus!", "No phone!", "Drink water."]
        );
        assert_eq!(quiz.recommended_duration, 25);
    }

    #[tokio::test]
    async fn missing_field_falls_back_entirely() {
        // No partial payloads: a reply without an answer is unusable.
        let generator =
            ScriptedGenerator::replying(r#"{"question": "What is mitosis?", "session_tips": []}"#);
        let quiz = generate_unlock_question(&generator, "notes").await.unwrap();
        assert_eq!(quiz.question, "What is the main topic?");
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let generator = ScriptedGenerator::failing(GenerationError::Blocked);
        let result = generate_unlock_question(&generator, "notes").await;
        assert!(matches!(result, Err(GenerationError::Blocked)));
    }

    #[tokio::test]
    async fn briefing_never_contains_the_answer() {
        let generator = Arc::new(ScriptedGenerator::replying(REPLY));
        let filter = TimeBlockingFilter::new(generator);
        let output = filter.apply("cell biology notes", "normal").await.unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["question"], "Which organelle produces ATP?");
        assert!(json.get("answer").is_none());
        assert!(!json.to_string().contains("The mitochondria"));
    }
}

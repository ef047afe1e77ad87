//! Metacognition filter: key concepts, Bloom's-taxonomy questions, summary.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Filter, FilterFuture, FilterKind, FilterOutput};
use crate::{GenerationError, Generator, coerce, prompts};

/// One question per Bloom's-taxonomy level, serialized with the level
/// names capitalized as the prompt requests them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloomQuestions {
    #[serde(rename = "Remember")]
    pub remember: String,
    #[serde(rename = "Understand")]
    pub understand: String,
    #[serde(rename = "Apply")]
    pub apply: String,
    #[serde(rename = "Analyze")]
    pub analyze: String,
    #[serde(rename = "Evaluate")]
    pub evaluate: String,
    #[serde(rename = "Create")]
    pub create: String,
}

/// Output of the `blue` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetacognitionOutput {
    pub concepts: Vec<String>,
    pub questions: BloomQuestions,
    pub summary: String,
}

impl MetacognitionOutput {
    /// Generic study questions served when the model's reply does not parse.
    pub fn fallback() -> Self {
        Self {
            concepts: vec!["Key ideas from the text".to_string()],
            questions: BloomQuestions {
                remember: "What are the key terms in this text?".to_string(),
                understand: "How would you restate the main idea in your own words?".to_string(),
                apply: "Where could you use this material in practice?".to_string(),
                analyze: "How do the main ideas in this text relate to each other?".to_string(),
                evaluate: "Which claim in this text is the strongest, and why?".to_string(),
                create: "What new example could you build from this material?".to_string(),
            },
            summary: "The material could not be summarized automatically. Re-read it and answer the questions above.".to_string(),
        }
    }
}

/// Bloom's-taxonomy study questions for `text`.
pub async fn metacognition(
    generator: &dyn Generator,
    text: &str,
) -> Result<MetacognitionOutput, GenerationError> {
    let reply = generator.generate(&prompts::metacognition(text)).await?;
    Ok(coerce::parse_reply(&reply).unwrap_or_else(MetacognitionOutput::fallback))
}

/// The `blue` filter.
pub struct MetacognitionFilter {
    generator: Arc<dyn Generator>,
}

impl MetacognitionFilter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Filter for MetacognitionFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Metacognition
    }

    fn apply<'a>(&'a self, text: &'a str, _mode: &'a str) -> FilterFuture<'a> {
        Box::pin(async move {
            let output = metacognition(self.generator.as_ref(), text).await?;
            Ok(FilterOutput::Metacognition(output))
        })
    }
}

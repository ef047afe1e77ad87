//! Memory filter: fill-in-the-blank recall exercises by difficulty.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Filter, FilterFuture, FilterKind, FilterOutput};
use crate::{GenerationError, Generator, coerce, prompts};

/// Exercise tiers, ordered easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One blank's solution and its hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blank {
    pub answer: String,
    pub hint: String,
}

/// A summary paragraph with `[BLANK_1]`, `[BLANK_2]` markers where the
/// blanked words belong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryExercise {
    pub text: String,
    pub blanks: Vec<Blank>,
}

/// Output of the `yellow` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryOutput {
    pub exercises: BTreeMap<Difficulty, MemoryExercise>,
    #[serde(default)]
    pub mode: String,
}

impl MemoryOutput {
    /// Single easy exercise served when the model's reply does not parse.
    pub fn fallback() -> Self {
        let mut exercises = BTreeMap::new();
        exercises.insert(
            Difficulty::Easy,
            MemoryExercise {
                text: "Could not generate exercises. Please try again or use shorter text."
                    .to_string(),
                blanks: Vec::new(),
            },
        );
        Self {
            exercises,
            mode: String::new(),
        }
    }
}

/// Fill-in-the-blank exercises for `text`.
///
/// The requested `mode` always wins over whatever the model echoed back.
pub async fn memory_exercises(
    generator: &dyn Generator,
    text: &str,
    mode: &str,
) -> Result<MemoryOutput, GenerationError> {
    let reply = generator.generate(&prompts::memory_test(text, mode)).await?;
    let mut output: MemoryOutput =
        coerce::parse_reply(&reply).unwrap_or_else(MemoryOutput::fallback);
    output.mode = mode.to_string();
    Ok(output)
}

/// Local deterministic hint for a blank's answer word.
pub fn hint_for(word: &str) -> String {
    match word.trim().chars().next() {
        Some(first) => {
            let first = first.to_lowercase();
            format!("Starts with {first}...")
        }
        None => "No hint available.".to_string(),
    }
}

/// The `yellow` filter.
pub struct MemoryFilter {
    generator: Arc<dyn Generator>,
}

impl MemoryFilter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Filter for MemoryFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Memory
    }

    fn apply<'a>(&'a self, text: &'a str, mode: &'a str) -> FilterFuture<'a> {
        Box::pin(async move {
            let output = memory_exercises(self.generator.as_ref(), text, mode).await?;
            Ok(FilterOutput::Memory(output))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    const REPLY: &str = r#"{
        "exercises": {
            "easy": {
                "text": "Cells produce [BLANK_1] through respiration.",
                "blanks": [{"answer": "ATP", "hint": "Starts with A..."}]
            },
            "medium": {
                "text": "The [BLANK_1] hosts the [BLANK_2] cycle.",
                "blanks": [
                    {"answer": "mitochondria", "hint": "Starts with m..."},
                    {"answer": "Krebs", "hint": "Starts with K..."}
                ]
            },
            "hard": {
                "text": "Oxidative [BLANK_1] yields most cellular [BLANK_2].",
                "blanks": [
                    {"answer": "phosphorylation", "hint": "Starts with p..."},
                    {"answer": "energy", "hint": "Starts with e..."}
                ]
            }
        },
        "mode": "normal"
    }"#;

    #[tokio::test]
    async fn parses_three_tiers_with_blank_markers() {
        let generator = ScriptedGenerator::replying(REPLY);
        let output = memory_exercises(&generator, "cell biology notes", "normal")
            .await
            .unwrap();
        assert_eq!(output.exercises.len(), 3);
        let easy = &output.exercises[&Difficulty::Easy];
        assert!(easy.text.contains("[BLANK_1]"));
        assert_eq!(easy.blanks[0].answer, "ATP");
        let hard = &output.exercises[&Difficulty::Hard];
        assert_eq!(hard.blanks.len(), 2);
    }

    #[tokio::test]
    async fn requested_mode_wins_over_model_echo() {
        let generator = ScriptedGenerator::replying(REPLY);
        let output = memory_exercises(&generator, "notes", "exam")
            .await
            .unwrap();
        assert_eq!(output.mode, "exam");
        assert!(generator.prompts()[0].contains("exam"));
    }

    #[tokio::test]
    async fn garbage_reply_falls_back_to_single_easy_exercise() {
        let generator = ScriptedGenerator::replying("no JSON here");
        let output = memory_exercises(&generator, "notes", "normal").await.unwrap();
        assert_eq!(output.exercises.len(), 1);
        let easy = &output.exercises[&Difficulty::Easy];
        assert!(easy.text.starts_with("Could not generate exercises"));
        assert!(easy.blanks.is_empty());
        assert_eq!(output.mode, "normal");
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let generator = ScriptedGenerator::failing(GenerationError::MissingApiKey);
        let result = memory_exercises(&generator, "notes", "normal").await;
        assert!(matches!(result, Err(GenerationError::MissingApiKey)));
    }

    #[test]
    fn difficulties_serialize_in_tier_order() {
        let mut exercises = BTreeMap::new();
        for tier in [Difficulty::Hard, Difficulty::Easy, Difficulty::Medium] {
            exercises.insert(
                tier,
                MemoryExercise {
                    text: String::new(),
                    blanks: Vec::new(),
                },
            );
        }
        let output = MemoryOutput {
            exercises,
            mode: "normal".to_string(),
        };
        let json = serde_json::to_string(&output).unwrap();
        let easy = json.find("easy").unwrap();
        let medium = json.find("medium").unwrap();
        let hard = json.find("hard").unwrap();
        assert!(easy < medium && medium < hard);
    }

    #[test]
    fn hint_is_the_lowercased_leading_letter() {
        assert_eq!(hint_for("mitochondria"), "Starts with m...");
        assert_eq!(hint_for("  Krebs  "), "Starts with k...");
        assert_eq!(hint_for(""), "No hint available.");
        assert_eq!(hint_for("   "), "No hint available.");
    }
}

//! Boredom filter: humor rewrite, jokes, sarcasm, fun facts.
//!
//! Two generation calls (jokes, then the silly rewrite); the sarcastic
//! commentary and fun facts always come from fixed local pools. Generation
//! failure never propagates out of this filter.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::{Filter, FilterFuture, FilterKind, FilterOutput};
use crate::{Generator, prompts};

const MAX_JOKES: usize = 3;
const MAX_SARCASTIC_REMARKS: usize = 3;
const FUN_FACT_COUNT: usize = 3;

/// Sentences this short are not worth mocking.
const MIN_SARCASM_WORDS: usize = 5;

const SILLY_PREFIXES: [&str; 5] = [
    "🤪 Hold onto your textbooks!",
    "🎉 Plot twist:",
    "🎪 Ladies and gentlemen:",
    "🦄 In a universe where studying is fun:",
    "🎭 *dramatic voice*",
];

const SARCASTIC_RESPONSES: [&str; 5] = [
    "Oh wow, riveting stuff! 🙄",
    "Because THIS is exactly how I wanted to spend my day... 😏",
    "Plot twist: It actually gets more interesting! 📖",
    "Spoiler alert: You'll need to know this. Sorry! 🤷",
    "Your brain cells will thank me later. You're welcome! 🧠",
];

const FUN_FACTS: [&str; 4] = [
    "🎨 Studies show that learning with humor improves retention by up to 30%!",
    "🧠 Your brain uses 20% of your body's energy while studying.",
    "☕ The smell of coffee can help you concentrate!",
    "🚶 Walking while studying can increase creativity by 60%!",
];

// ── Output types ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarcasticRemark {
    pub original: String,
    pub sarcasm: String,
}

/// Output of the `orange` filter.
#[derive(Debug, Clone, Serialize)]
pub struct BoredomOutput {
    pub silly_text: String,
    pub jokes: Vec<Joke>,
    pub sarcastic_commentary: Vec<SarcasticRemark>,
    pub fun_facts: Vec<String>,
    pub original_text: String,
}

// ── Local pieces ───────────────────────────────────────────────────

/// Parse `Q:`/`A:` (or `Question:`/`Answer:`) lines into joke pairs.
/// An answer with no pending setup is dropped; a second question replaces
/// an unanswered one.
fn parse_jokes(reply: &str) -> Vec<Joke> {
    let mut jokes = Vec::new();
    let mut setup: Option<String> = None;
    for line in reply.lines() {
        let line = line.trim();
        if let Some(rest) = line
            .strip_prefix("Q:")
            .or_else(|| line.strip_prefix("Question:"))
        {
            setup = Some(rest.trim().to_string());
        } else if let Some(rest) = line
            .strip_prefix("A:")
            .or_else(|| line.strip_prefix("Answer:"))
            && let Some(pending) = setup.take()
        {
            jokes.push(Joke {
                setup: pending,
                punchline: rest.trim().to_string(),
            });
        }
    }
    jokes.truncate(MAX_JOKES);
    jokes
}

fn fallback_jokes() -> Vec<Joke> {
    vec![
        Joke {
            setup: "Why did the student bring a ladder to class?".to_string(),
            punchline: "To reach the high grades! 📚".to_string(),
        },
        Joke {
            setup: "Why is 6 afraid of 7?".to_string(),
            punchline: "Because 7 8 9! (Classic math logic) 🔢".to_string(),
        },
        Joke {
            setup: "What is the mitochondria's favorite pickup line?".to_string(),
            punchline: "You power my world, babe! ⚡".to_string(),
        },
    ]
}

/// Pair the first few substantial sentences with remarks from the fixed
/// pool, cycling in order.
fn sarcastic_commentary(text: &str) -> Vec<SarcasticRemark> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take(5)
        .filter(|sentence| sentence.split_whitespace().count() > MIN_SARCASM_WORDS)
        .take(MAX_SARCASTIC_REMARKS)
        .enumerate()
        .map(|(i, sentence)| SarcasticRemark {
            original: sentence.to_string(),
            sarcasm: SARCASTIC_RESPONSES[i % SARCASTIC_RESPONSES.len()].to_string(),
        })
        .collect()
}

fn fun_facts() -> Vec<String> {
    FUN_FACTS
        .iter()
        .take(FUN_FACT_COUNT)
        .map(|fact| fact.to_string())
        .collect()
}

fn fallback_silly(text: &str) -> String {
    format!(
        "{}\n\n{}\n\n(Could not generate silly version, but here's the original! 🤪)",
        SILLY_PREFIXES[0], text
    )
}

// ── Entry point ────────────────────────────────────────────────────

/// Humor treatment of `text`. Never fails: each generated piece degrades
/// to its fixed fallback independently.
pub async fn boredom(generator: &dyn Generator, text: &str) -> BoredomOutput {
    let jokes = match generator.generate(&prompts::jokes(text)).await {
        Ok(reply) => {
            let parsed = parse_jokes(&reply);
            if parsed.is_empty() { fallback_jokes() } else { parsed }
        }
        Err(err) => {
            warn!("joke generation failed, using fallback: {err}");
            fallback_jokes()
        }
    };

    let silly_text = match generator.generate(&prompts::silly_rewrite(text)).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("silly rewrite failed, using fallback: {err}");
            fallback_silly(text)
        }
    };

    BoredomOutput {
        silly_text,
        jokes,
        sarcastic_commentary: sarcastic_commentary(text),
        fun_facts: fun_facts(),
        original_text: text.to_string(),
    }
}

/// The `orange` filter.
pub struct BoredomFilter {
    generator: Arc<dyn Generator>,
}

impl BoredomFilter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Filter for BoredomFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Boredom
    }

    fn apply<'a>(&'a self, text: &'a str, _mode: &'a str) -> FilterFuture<'a> {
        Box::pin(async move {
            let output = boredom(self.generator.as_ref(), text).await;
            Ok(FilterOutput::Boredom(output))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerationError;
    use crate::testing::ScriptedGenerator;

    #[test]
    fn parses_q_a_pairs_in_both_spellings() {
        let jokes = parse_jokes(
            "Q: Why do atoms lie?\nA: They make up everything!\n\
             Question: What's a proton's mood?\nAnswer: Positive!",
        );
        assert_eq!(jokes.len(), 2);
        assert_eq!(jokes[0].setup, "Why do atoms lie?");
        assert_eq!(jokes[0].punchline, "They make up everything!");
        assert_eq!(jokes[1].setup, "What's a proton's mood?");
    }

    #[test]
    fn answer_without_setup_is_dropped() {
        let jokes = parse_jokes("A: orphan punchline\nQ: Real setup?\nA: Real punchline!");
        assert_eq!(jokes.len(), 1);
        assert_eq!(jokes[0].setup, "Real setup?");
    }

    #[test]
    fn second_question_replaces_unanswered_one() {
        let jokes = parse_jokes("Q: First setup?\nQ: Second setup?\nA: The punchline!");
        assert_eq!(jokes.len(), 1);
        assert_eq!(jokes[0].setup, "Second setup?");
    }

    #[test]
    fn jokes_capped_at_three() {
        let reply = (1..=4)
            .map(|i| format!("Q: Setup {i}?\nA: Punchline {i}!"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_jokes(&reply).len(), MAX_JOKES);
    }

    #[test]
    fn prose_reply_parses_to_no_jokes() {
        assert!(parse_jokes("Here are three jokes you might enjoy.").is_empty());
    }

    #[test]
    fn sarcasm_skips_short_sentences() {
        let remarks = sarcastic_commentary(
            "Short one. The quick brown fox jumps over the lazy dog daily.",
        );
        assert_eq!(remarks.len(), 1);
        assert!(remarks[0].original.starts_with("The quick brown fox"));
    }

    #[test]
    fn sarcasm_pool_is_cycled_in_order() {
        let text = "The first sentence has more than five words in it. \
                    The second sentence also has more than five words. \
                    The third sentence clearly has more than five words too.";
        let remarks = sarcastic_commentary(text);
        assert_eq!(remarks.len(), 3);
        assert_eq!(remarks[0].sarcasm, SARCASTIC_RESPONSES[0]);
        assert_eq!(remarks[1].sarcasm, SARCASTIC_RESPONSES[1]);
        assert_eq!(remarks[2].sarcasm, SARCASTIC_RESPONSES[2]);
    }

    #[test]
    fn sarcasm_only_considers_the_first_five_sentences() {
        let text = "One two. Three four. Five six. Seven eight. \
                    This fifth sentence has definitely more than five words. \
                    This sixth sentence would also qualify with many words here.";
        let remarks = sarcastic_commentary(text);
        assert_eq!(remarks.len(), 1);
        assert!(remarks[0].original.starts_with("This fifth"));
    }

    #[test]
    fn fun_facts_are_the_leading_three() {
        let facts = fun_facts();
        assert_eq!(facts.len(), FUN_FACT_COUNT);
        assert_eq!(facts[0], FUN_FACTS[0]);
        assert_eq!(facts[2], FUN_FACTS[2]);
    }

    #[tokio::test]
    async fn success_path_uses_both_replies_in_order() {
        let generator = ScriptedGenerator::new([
            Ok("Q: Why study cells?\nA: They're the building blocks!".to_string()),
            Ok("yo so cells are basically tiny factories fr 🏭".to_string()),
        ]);
        let output = boredom(&generator, "Cells are the basic unit of life.").await;
        assert_eq!(output.jokes.len(), 1);
        assert_eq!(output.silly_text, "yo so cells are basically tiny factories fr 🏭");
        assert_eq!(output.original_text, "Cells are the basic unit of life.");

        let prompts = generator.prompts();
        assert!(prompts[0].contains("jokes or puns"));
        assert!(prompts[1].contains("Rewrite"));
    }

    #[tokio::test]
    async fn generation_failures_fall_back_everywhere() {
        let generator = ScriptedGenerator::new([
            Err(GenerationError::Timeout),
            Err(GenerationError::Timeout),
        ]);
        let text = "Cells are the basic unit of life and they divide constantly.";
        let output = boredom(&generator, text).await;

        assert_eq!(output.jokes, fallback_jokes());
        assert!(output.silly_text.starts_with(SILLY_PREFIXES[0]));
        assert!(output.silly_text.contains(text));
        assert!(!output.sarcastic_commentary.is_empty());
        assert_eq!(output.fun_facts.len(), FUN_FACT_COUNT);
    }

    #[tokio::test]
    async fn prose_joke_reply_falls_back() {
        let generator = ScriptedGenerator::new([
            Ok("I would rather not tell jokes today.".to_string()),
            Ok("silly version".to_string()),
        ]);
        let output = boredom(&generator, "notes").await;
        assert_eq!(output.jokes, fallback_jokes());
    }

    #[test]
    fn output_serializes_with_expected_keys() {
        let output = BoredomOutput {
            silly_text: "s".to_string(),
            jokes: fallback_jokes(),
            sarcastic_commentary: Vec::new(),
            fun_facts: fun_facts(),
            original_text: "o".to_string(),
        };
        let json = serde_json::to_value(&output).unwrap();
        for key in [
            "silly_text",
            "jokes",
            "sarcastic_commentary",
            "fun_facts",
            "original_text",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["jokes"][0]["setup"], fallback_jokes()[0].setup);
    }
}

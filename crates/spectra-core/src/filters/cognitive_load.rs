//! Cognitive-load filter: noise removal, word-bounded chunking, and a
//! locally computed learning path.
//!
//! Unlike the other filters, most of this output is computed without the
//! model. Only the prerequisite list is AI-generated, and it degrades to a
//! fixed list on any failure, so this filter never returns an error.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::{Filter, FilterFuture, FilterKind, FilterOutput};
use crate::{Generator, prompts};

/// Maximum words per chunk; a chunk closes at the first sentence
/// terminator at or past this bound.
const MAX_CHUNK_WORDS: usize = 300;

/// Chars of a chunk's lead sentence kept as its main idea.
const MAIN_IDEA_CHARS: usize = 100;

const MAX_PREREQUISITES: usize = 5;
const PREREQ_STEP_MINUTES: u32 = 5;
const CHUNK_STEP_MINUTES: u32 = 10;

static RE_PARENTHETICAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").ok());

static NOISE_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s+in other words,?\s+",
        r"(?i)\s+that is to say,?\s+",
        r"(?i)\s+as mentioned before,?\s+",
        r"(?i)\s+as we know,?\s+",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

// ── Output types ───────────────────────────────────────────────────

/// Output of the `green` filter.
#[derive(Debug, Clone, Serialize)]
pub struct CognitiveLoadOutput {
    pub simplified_text: String,
    pub chunks: Vec<Chunk>,
    pub prerequisites: Vec<String>,
    pub concept_map: ConceptMap,
    pub learning_path: LearningPath,
    pub mode: String,
}

/// One word-bounded piece of the simplified text.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    /// 1-based position in reading order.
    pub id: usize,
    pub content: String,
    pub word_count: usize,
    /// Lead sentence, truncated to [`MAIN_IDEA_CHARS`].
    pub main_idea: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConceptMap {
    pub title: String,
    pub nodes: Vec<ConceptNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConceptNode {
    pub id: usize,
    pub label: String,
    pub description: String,
    /// 0-based layout index.
    pub position: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningPath {
    pub steps: Vec<LearningStep>,
    /// Minutes over the chunk steps only; prerequisite review is extra.
    pub total_time_estimate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningStep {
    pub order: usize,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<usize>,
    pub time_estimate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Prerequisite,
    MainContent,
}

// ── Local computation ──────────────────────────────────────────────

/// Strip parenthetical asides and filler phrases, collapse whitespace.
fn remove_noise(text: &str) -> String {
    let mut simplified = match RE_PARENTHETICAL.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };
    for re in NOISE_PHRASES.iter() {
        simplified = re.replace_all(&simplified, " ").into_owned();
    }
    simplified.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ends_sentence(word: &str) -> bool {
    word.ends_with('.') || word.ends_with('!') || word.ends_with('?')
}

/// Lead sentence of `content`, truncated to [`MAIN_IDEA_CHARS`].
fn main_idea(content: &str) -> String {
    let first = content
        .split(['.', '!', '?'])
        .next()
        .unwrap_or("")
        .trim();
    if first.chars().count() > MAIN_IDEA_CHARS {
        format!("{}...", crate::text::truncate_chars(first, MAIN_IDEA_CHARS))
    } else {
        first.to_string()
    }
}

fn make_chunk(id: usize, words: &[&str]) -> Chunk {
    let content = words.join(" ");
    Chunk {
        id,
        word_count: words.len(),
        main_idea: main_idea(&content),
        content,
    }
}

/// Split `text` into word-bounded chunks that close at sentence ends.
fn chunk_text(text: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        current.push(word);
        if current.len() >= MAX_CHUNK_WORDS && ends_sentence(word) {
            chunks.push(make_chunk(chunks.len() + 1, &current));
            current.clear();
        }
    }
    if !current.is_empty() {
        chunks.push(make_chunk(chunks.len() + 1, &current));
    }
    chunks
}

fn concept_map(chunks: &[Chunk]) -> ConceptMap {
    ConceptMap {
        title: "Learning Roadmap".to_string(),
        nodes: chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| ConceptNode {
                id: chunk.id,
                label: format!("Step {}", chunk.id),
                description: chunk.main_idea.clone(),
                position: i,
            })
            .collect(),
    }
}

fn learning_path(prerequisites: &[String], chunks: &[Chunk]) -> LearningPath {
    let mut steps = Vec::with_capacity(prerequisites.len() + chunks.len());
    for (i, prereq) in prerequisites.iter().enumerate() {
        steps.push(LearningStep {
            order: i + 1,
            step_type: StepType::Prerequisite,
            content: prereq.clone(),
            chunk_id: None,
            time_estimate: PREREQ_STEP_MINUTES,
        });
    }
    for chunk in chunks {
        steps.push(LearningStep {
            order: steps.len() + 1,
            step_type: StepType::MainContent,
            content: chunk.main_idea.clone(),
            chunk_id: Some(chunk.id),
            time_estimate: CHUNK_STEP_MINUTES,
        });
    }
    LearningPath {
        steps,
        total_time_estimate: chunks.len() as u32 * CHUNK_STEP_MINUTES,
    }
}

// ── AI-backed prerequisites ────────────────────────────────────────

fn fallback_prerequisites() -> Vec<String> {
    vec![
        "Basic understanding of the subject area".to_string(),
        "Familiarity with key terminology".to_string(),
        "Foundational concepts in this domain".to_string(),
    ]
}

/// Ask the model for prerequisite concepts; bulleted lines, capped at
/// [`MAX_PREREQUISITES`]. Any failure yields the fixed fallback list.
async fn generate_prerequisites(generator: &dyn Generator, text: &str) -> Vec<String> {
    let reply = match generator.generate(&prompts::prerequisites(text)).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("prerequisite generation failed, using fallback: {err}");
            return fallback_prerequisites();
        }
    };
    let items: Vec<String> = reply
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix('-')
                .or_else(|| line.strip_prefix('•'))
                .map(str::trim)
        })
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .take(MAX_PREREQUISITES)
        .collect();
    if items.is_empty() {
        fallback_prerequisites()
    } else {
        items
    }
}

// ── Entry point ────────────────────────────────────────────────────

/// Chunked reading plan for `text`. Never fails: the one AI-backed piece
/// (prerequisites) degrades to its fallback list.
pub async fn cognitive_load(
    generator: &dyn Generator,
    text: &str,
    mode: &str,
) -> CognitiveLoadOutput {
    let simplified_text = remove_noise(text);
    let chunks = chunk_text(&simplified_text);
    let prerequisites = generate_prerequisites(generator, text).await;
    let concept_map = concept_map(&chunks);
    let learning_path = learning_path(&prerequisites, &chunks);
    CognitiveLoadOutput {
        simplified_text,
        chunks,
        prerequisites,
        concept_map,
        learning_path,
        mode: mode.to_string(),
    }
}

/// The `green` filter.
pub struct CognitiveLoadFilter {
    generator: Arc<dyn Generator>,
}

impl CognitiveLoadFilter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Filter for CognitiveLoadFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::CognitiveLoad
    }

    fn apply<'a>(&'a self, text: &'a str, mode: &'a str) -> FilterFuture<'a> {
        Box::pin(async move {
            let output = cognitive_load(self.generator.as_ref(), text, mode).await;
            Ok(FilterOutput::CognitiveLoad(output))
        })
    }
}

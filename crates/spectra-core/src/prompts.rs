//! Prompt templates, one pure function per generation call.
//!
//! Each template embeds the study text after applying its own character
//! bound (see [`crate::text::truncate_chars`]); the bounds differ because
//! the filters tolerate different amounts of context. Templates that expect
//! a JSON reply spell the exact shape out in the prompt; the counterpart
//! parse types live with each filter.

use crate::text;

/// Bound for the unlock-question prompt.
const UNLOCK_TEXT_LIMIT: usize = 2000;
/// Bound for the full-text analysis prompts (metacognition, memory, research).
const ANALYSIS_TEXT_LIMIT: usize = 4000;
/// Bound for the humor prompts.
const HUMOR_TEXT_LIMIT: usize = 1000;
/// Bound for the prerequisite prompt, which needs only the opening of the text.
const PREREQ_TEXT_LIMIT: usize = 500;

/// Verification question plus session metadata for the time-blocking filter.
pub fn unlock_question(text: &str) -> String {
    format!(
        r#"Generate a specific verification question from this text to check if the student actually studied.

TEXT:
{}

OUTPUT FORMAT (JSON ONLY):
{{
    "question": "The question...",
    "answer": "The correct answer (short concepts)",
    "session_tips": ["Tip 1", "Tip 2", "Tip 3"],
    "recommended_duration": 25
}}"#,
        text::truncate_chars(text, UNLOCK_TEXT_LIMIT)
    )
}

/// Bloom's-taxonomy analysis for the metacognition filter.
pub fn metacognition(text: &str) -> String {
    format!(
        r#"Analyze the following study text and apply Bloom's Taxonomy.

TEXT:
{}

TASK:
1. Identify 5-7 key concepts.
2. Generate ONE specific, high-quality question for EACH level of Bloom's Taxonomy (Remember, Understand, Apply, Analyze, Evaluate, Create).
3. Write a brief 2-sentence summary of the text.

OUTPUT FORMAT:
Return ONLY valid JSON with this structure:
{{
    "concepts": ["concept1", "concept2", ...],
    "questions": {{
        "Remember": "Question...",
        "Understand": "Question...",
        "Apply": "Question...",
        "Analyze": "Question...",
        "Evaluate": "Question...",
        "Create": "Question..."
    }},
    "summary": "Brief summary text..."
}}"#,
        text::truncate_chars(text, ANALYSIS_TEXT_LIMIT)
    )
}

/// Fill-in-the-blank exercises for the memory filter.
pub fn memory_test(text: &str, mode: &str) -> String {
    format!(
        r#"Create a memory test from this study text.

TEXT:
{}

TASK:
1. Create 3 summary paragraphs of increasing complexity (Easy, Medium, Hard).
2. Valid JSON output only.

OUTPUT FORMAT:
{{
    "exercises": {{
        "easy": {{
            "text": "The summary text with [BLANK_1], [BLANK_2] etc. inserted where key words should be.",
            "blanks": [
                {{"answer": "key_word_1", "hint": "Starts with k..."}},
                {{"answer": "key_word_2", "hint": "Starts with k..."}}
            ]
        }},
        "medium": {{ "text": "...", "blanks": [...] }},
        "hard": {{ "text": "...", "blanks": [...] }}
    }},
    "mode": "{}"
}}"#,
        text::truncate_chars(text, ANALYSIS_TEXT_LIMIT),
        mode
    )
}

/// Bulleted prerequisite list for the cognitive-load filter.
pub fn prerequisites(text: &str) -> String {
    format!(
        r#"Analyze this text and identify 3-5 prerequisite concepts or knowledge areas that students should understand BEFORE studying this material.

Text: "{}..."

List prerequisites in order of importance, one per line, starting with "- "."#,
        text::truncate_chars(text, PREREQ_TEXT_LIMIT)
    )
}

/// Topics, search queries, and a phased plan for the research filter.
pub fn research(text: &str) -> String {
    format!(
        r#"Act as a research assistant. Analyze this text and provide resources for deeper learning.

TEXT:
{}

TASK:
1. Identify 5 Key Topics.
2. Generate specific Google/YouTube search queries for each.
3. Create a 4-phase research plan.

OUTPUT FORMAT (JSON ONLY):
{{
    "topics": ["Topic 1", "Topic 2", ...],
    "search_queries": [
        {{"basic": "Topic 1", "video": "Topic 1 tutorial", "academic": "Topic 1 research"}},
        ...
    ],
    "research_plan": {{
        "phases": [
            {{"name": "Phase 1: Foundation", "time": "1 hour", "activities": ["Read...", "Watch..."]}},
            ...
        ]
    }}
}}"#,
        text::truncate_chars(text, ANALYSIS_TEXT_LIMIT)
    )
}

/// Casual rewrite for the boredom filter. Plain text reply, not JSON.
pub fn silly_rewrite(text: &str) -> String {
    format!(
        r#"Rewrite this study text to be extremely casual, use Gen Z slang, emojis, and be funny/silly. Keep the core meaning but make it entertaining.

Text: "{}...""#,
        text::truncate_chars(text, HUMOR_TEXT_LIMIT)
    )
}

/// Q/A-formatted jokes for the boredom filter. Line-oriented reply, not JSON.
pub fn jokes(text: &str) -> String {
    format!(
        r#"Generate 3 funny, lighthearted jokes or puns related to this study material.
Format as:
Q: [Setup]
A: [Punchline]

TEXT: {}"#,
        text::truncate_chars(text, HUMOR_TEXT_LIMIT)
    )
}

//! Research filter: key topics, tiered search queries, phased plan.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Filter, FilterFuture, FilterKind, FilterOutput};
use crate::{GenerationError, Generator, coerce, prompts};

/// Search queries for one topic, tiered by medium.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuerySet {
    pub basic: String,
    pub video: String,
    pub academic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPhase {
    pub name: String,
    /// Free-form estimate, e.g. "1 hour".
    pub time: String,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub phases: Vec<ResearchPhase>,
}

/// Output of the `purple` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutput {
    pub topics: Vec<String>,
    pub search_queries: Vec<SearchQuerySet>,
    pub research_plan: ResearchPlan,
}

impl ResearchOutput {
    /// Served when the model's reply does not parse.
    pub fn fallback() -> Self {
        Self {
            topics: vec!["Research Error".to_string()],
            search_queries: Vec::new(),
            research_plan: ResearchPlan { phases: Vec::new() },
        }
    }
}

/// Research starting points for `text`.
pub async fn research(
    generator: &dyn Generator,
    text: &str,
) -> Result<ResearchOutput, GenerationError> {
    let reply = generator.generate(&prompts::research(text)).await?;
    Ok(coerce::parse_reply(&reply).unwrap_or_else(ResearchOutput::fallback))
}

/// The `purple` filter.
pub struct ResearchFilter {
    generator: Arc<dyn Generator>,
}

impl ResearchFilter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Filter for ResearchFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Research
    }

    fn apply<'a>(&'a self, text: &'a str, _mode: &'a str) -> FilterFuture<'a> {
        Box::pin(async move {
            let output = research(self.generator.as_ref(), text).await?;
            Ok(FilterOutput::Research(output))
        })
    }
}

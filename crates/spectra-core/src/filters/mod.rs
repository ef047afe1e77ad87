//! The six cognitive filters and the registry that dispatches to them.
//!
//! Each filter is a stateless transform from study text to a structured
//! learning artifact, built from a prompt template plus the shared
//! [`Generator`] and the response coercer. Filters are registered in a
//! [`FilterSet`] constructed once at startup; handlers look them up by
//! [`FilterKind`] wire tag.

pub mod boredom;
pub mod cognitive_load;
pub mod memory;
pub mod metacognition;
pub mod research;
pub mod time_blocking;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GenerationError, Generator};

pub use boredom::{BoredomFilter, BoredomOutput};
pub use cognitive_load::{CognitiveLoadFilter, CognitiveLoadOutput};
pub use memory::{MemoryFilter, MemoryOutput};
pub use metacognition::{MetacognitionFilter, MetacognitionOutput};
pub use research::{ResearchFilter, ResearchOutput};
pub use time_blocking::{StudyBriefing, TimeBlockingFilter, UnlockQuestion};

// ── Kinds ──────────────────────────────────────────────────────────

/// The fixed set of filter tags accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// `blue`: Bloom's-taxonomy questions, concepts, summary.
    #[serde(rename = "blue")]
    Metacognition,
    /// `yellow`: fill-in-the-blank recall exercises.
    #[serde(rename = "yellow")]
    Memory,
    /// `green`: simplified text, chunks, prerequisites, learning path.
    #[serde(rename = "green")]
    CognitiveLoad,
    /// `grey`: preview of a time-locked study session.
    #[serde(rename = "grey")]
    TimeBlocking,
    /// `purple`: topics, search queries, research plan.
    #[serde(rename = "purple")]
    Research,
    /// `orange`: humor rewrite, jokes, sarcasm, fun facts.
    #[serde(rename = "orange")]
    Boredom,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Metacognition,
        FilterKind::Memory,
        FilterKind::CognitiveLoad,
        FilterKind::TimeBlocking,
        FilterKind::Research,
        FilterKind::Boredom,
    ];

    /// Wire tag for this filter.
    pub fn tag(&self) -> &'static str {
        match self {
            FilterKind::Metacognition => "blue",
            FilterKind::Memory => "yellow",
            FilterKind::CognitiveLoad => "green",
            FilterKind::TimeBlocking => "grey",
            FilterKind::Research => "purple",
            FilterKind::Boredom => "orange",
        }
    }

    /// Parse a wire tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        FilterKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Filter trait ───────────────────────────────────────────────────

/// Boxed future returned by [`Filter::apply`].
pub type FilterFuture<'a> = Pin<Box<dyn Future<Output = Result<FilterOutput, FilterError>> + Send + 'a>>;

/// A stateless transform from study text to a learning artifact.
///
/// `mode` is a free-form variant selector; filters that do not use it
/// ignore it.
pub trait Filter: Send + Sync {
    fn kind(&self) -> FilterKind;
    fn apply<'a>(&'a self, text: &'a str, mode: &'a str) -> FilterFuture<'a>;
}

/// Filter dispatch failures.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("no filter registered for tag: {0}")]
    NotRegistered(FilterKind),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Typed output of any filter. Serializes as the inner payload, without
/// an enum tag, so the wire sees each filter's declared schema directly.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FilterOutput {
    Metacognition(MetacognitionOutput),
    Memory(MemoryOutput),
    CognitiveLoad(CognitiveLoadOutput),
    TimeBlocking(StudyBriefing),
    Research(ResearchOutput),
    Boredom(BoredomOutput),
}

// ── Registry ───────────────────────────────────────────────────────

/// Registry of filters keyed by [`FilterKind`].
///
/// Built once at startup and shared behind an `Arc`; lookups are
/// read-only after construction.
pub struct FilterSet {
    filters: HashMap<FilterKind, Box<dyn Filter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// All six filters wired to one shared generator.
    pub fn with_default_filters(generator: Arc<dyn Generator>) -> Self {
        let mut set = Self::new();
        set.register(Box::new(MetacognitionFilter::new(generator.clone())));
        set.register(Box::new(MemoryFilter::new(generator.clone())));
        set.register(Box::new(CognitiveLoadFilter::new(generator.clone())));
        set.register(Box::new(TimeBlockingFilter::new(generator.clone())));
        set.register(Box::new(ResearchFilter::new(generator.clone())));
        set.register(Box::new(BoredomFilter::new(generator)));
        set
    }

    /// Register a filter under its own kind, replacing any prior entry.
    pub fn register(&mut self, filter: Box<dyn Filter>) {
        self.filters.insert(filter.kind(), filter);
    }

    pub fn get(&self, kind: FilterKind) -> Option<&dyn Filter> {
        self.filters.get(&kind).map(Box::as_ref)
    }

    /// Apply the filter registered under `kind` to `text`.
    pub async fn apply(
        &self,
        kind: FilterKind,
        text: &str,
        mode: &str,
    ) -> Result<FilterOutput, FilterError> {
        let filter = self.get(kind).ok_or(FilterError::NotRegistered(kind))?;
        filter.apply(text, mode).await
    }

    /// Registered kinds, in wire-tag declaration order.
    pub fn kinds(&self) -> Vec<FilterKind> {
        FilterKind::ALL
            .into_iter()
            .filter(|kind| self.filters.contains_key(kind))
            .collect()
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::new()
    }
}

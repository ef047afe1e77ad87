//! Cognitive study filters over the Google Gemini API.
//!
//! `spectra-core` turns pasted or PDF-extracted study text into structured
//! learning artifacts. Six independent filters each send one or two crafted
//! prompts to Gemini and reshape the reply into a typed payload: Bloom's
//! taxonomy questions, fill-in-the-blank recall exercises, a chunked reading
//! plan, a phased research plan, a humor rewrite, or a time-locked study
//! session gated by an unlock quiz.
//!
//! The stateful piece is the [`SessionLockManager`](session::SessionLockManager):
//! it issues a verification question when a session starts, keeps the
//! reference answer server-side, and unlocks only when the user's answer
//! clears a fuzzy recall threshold.
//!
//! # Getting started
//!
//! ```ignore
//! use spectra_core::filters::FilterSet;
//! use spectra_core::session::{SessionId, SessionLockManager};
//! use spectra_core::time::Clock;
//! use spectra_core::{FilterKind, GeminiClient, GeminiConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(GeminiClient::new(GeminiConfig::from_env())?);
//!
//!     // Stateless filters.
//!     let filters = FilterSet::with_default_filters(client.clone());
//!     let output = filters
//!         .apply(FilterKind::Metacognition, "The mitochondria is ...", "normal")
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&output)?);
//!
//!     // Time-locked session.
//!     let sessions = SessionLockManager::new(client, Clock::Default);
//!     let id = SessionId::from("demo");
//!     let start = sessions.start_session(&id, "The mitochondria is ...", None).await?;
//!     println!("answer this to unlock: {}", start.question);
//!     let unlocked = sessions.check_unlock(&id, "mitochondria")?;
//!     println!("unlocked: {unlocked}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`filters`] | [`Filter`](filters::Filter) trait, [`FilterSet`](filters::FilterSet) registry, the six filter implementations and their typed outputs |
//! | [`session`] | [`SessionLockManager`](session::SessionLockManager), the per-identity study-session state machine |
//! | [`matching`] | Stop-word filtered recall overlap used by the unlock check |
//! | [`prompts`] | Prompt templates, one pure function per generation call |
//! | [`coerce`] | Markdown-fence stripping and strict typed parsing of model replies |
//! | [`retry`] | Bounded retry policy for the generation client |
//! | [`text`] | Input validation and char-safe truncation |
//! | [`time`] | Real or fixed [`Clock`](time::Clock) for session timestamps |
//!
//! # Design principles
//!
//! 1. **The model is untrusted.** Every reply is parsed into an explicit
//!    type; anything that does not parse becomes that filter's deterministic
//!    fallback payload, never an error surfaced to the user.
//!
//! 2. **State is explicit.** Session state lives in one keyed map owned by
//!    the [`SessionLockManager`](session::SessionLockManager), injected where
//!    it is needed. No globals, no framework-managed stores.
//!
//! 3. **Failures are typed.** [`GenerationError`] distinguishes a missing
//!    credential from a timeout from a safety block, so callers can present
//!    each differently and the retry policy can decide what is worth
//!    retrying.

pub mod coerce;
pub mod filters;
pub mod matching;
pub mod prompts;
pub mod retry;
pub mod session;
pub mod text;
pub mod time;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

pub use filters::{FilterKind, FilterOutput, FilterSet};
pub use retry::RetryConfig;
pub use session::{SessionId, SessionLockManager};

// ── Constants ──────────────────────────────────────────────────────

/// Base URL for the Gemini `generateContent` REST endpoint.
pub const GEMINI_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model for all generation calls.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Output token cap sent with every request.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Per-attempt timeout, set on the HTTP client at construction.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ── Errors ─────────────────────────────────────────────────────────

/// Failure modes of the generation capability.
///
/// The retry policy only ever retries the transient subset (see
/// [`GenerationError::is_transient`]); a safety block or missing credential
/// is returned to the caller immediately.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// No API credential is configured. Distinct from transport failure so
    /// callers can tell "set GEMINI_API_KEY" apart from "Gemini is down".
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    /// The per-attempt timeout elapsed.
    #[error("generation request timed out")]
    Timeout,
    /// Connection or protocol level failure.
    #[error("generation transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status from the API.
    #[error("Gemini API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// The provider's safety filters suppressed the reply.
    #[error("content blocked by safety filters")]
    Blocked,
    /// A well-formed reply that contains no usable text.
    #[error("model returned no usable text")]
    Empty,
}

impl GenerationError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Timeout | GenerationError::Transport(_) => true,
            GenerationError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            GenerationError::MissingApiKey | GenerationError::Blocked | GenerationError::Empty => {
                false
            }
        }
    }
}

// ── Generator trait ────────────────────────────────────────────────

/// Boxed future returned by [`Generator::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// The opaque text-generation capability consumed by every filter.
///
/// The one production implementor is [`GeminiClient`]; tests substitute
/// scripted fakes. Retry behavior belongs to the implementor, not the
/// callers: a `generate` call either yields text or a final error.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> GenerateFuture<'_>;
}

// ── Request types ──────────────────────────────────────────────────

/// `generateContent` request body.
#[derive(Serialize, Debug)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Part {
    pub text: String,
}

/// Sampling parameters. Serialized in Gemini's camelCase form.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerateRequest {
    /// Wrap a single prompt in the nested contents/parts envelope.
    pub fn from_prompt(prompt: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: config,
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawGenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl RawGenerateResponse {
    /// Pull the reply text out of the candidate envelope.
    ///
    /// An absent candidate list means the prompt was suppressed before
    /// generation, which the API reports via `promptFeedback` or by simply
    /// returning nothing; both read as [`GenerationError::Blocked`].
    fn into_text(self) -> Result<String, GenerationError> {
        if let Some(feedback) = &self.prompt_feedback
            && feedback.block_reason.is_some()
        {
            return Err(GenerationError::Blocked);
        }

        let candidate = match self.candidates.and_then(|c| c.into_iter().next()) {
            Some(c) => c,
            None => return Err(GenerationError::Blocked),
        };

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(GenerationError::Blocked);
        }

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

// ── Config ─────────────────────────────────────────────────────────

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_URL_BASE.to_string(),
        }
    }

    /// Read the credential and optional model override from the environment.
    ///
    /// Returns `None` when `GEMINI_API_KEY` is unset or blank, which leaves
    /// the client inert rather than failing construction.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model;
        }
        Some(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the Gemini `generateContent` API.
///
/// Construction succeeds without a credential; every call on an inert
/// client reports [`GenerationError::MissingApiKey`]. Transient failures
/// are retried per the attached [`RetryConfig`].
pub struct GeminiClient {
    http: reqwest::Client,
    config: Option<GeminiConfig>,
    retry: RetryConfig,
}

impl GeminiClient {
    /// Create a client; pass `None` to build an inert one.
    pub fn new(config: Option<GeminiConfig>) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .user_agent("spectra/0.2")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            retry: RetryConfig::default(),
        })
    }

    /// Create a client from `GEMINI_API_KEY` / `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a credential is configured.
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }

    /// Generate text for a prompt, retrying transient failures.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        retry::retry_generate(&self.retry, || self.generate_once(prompt)).await
    }

    /// Single attempt, no retry.
    async fn generate_once(&self, prompt: &str) -> Result<String, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::MissingApiKey)?;

        let body = GenerateRequest::from_prompt(prompt, GenerationConfig::default());
        debug!(
            "generation request: model={}, prompt={} chars",
            config.model,
            prompt.chars().count(),
        );
        trace!(
            "request payload size: {} bytes",
            serde_json::to_string(&body).map_or(0, |s| s.len())
        );

        let url = format!(
            "{}/{}:generateContent?key={}",
            config.base_url, config.model, config.api_key
        );

        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::Transport(e.to_string())
            }
        })?;

        debug!(
            "generation response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawGenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Transport(format!("failed to parse response: {e}")))?;
        parsed.into_text()
    }
}

impl Generator for GeminiClient {
    fn generate(&self, prompt: &str) -> GenerateFuture<'_> {
        let prompt = prompt.to_owned();
        Box::pin(async move { self.generate(&prompt).await })
    }
}

// ── Convenience ────────────────────────────────────────────────────

/// One-shot generation with environment configuration and default retry.
pub async fn quick_generate(prompt: &str) -> Result<String, GenerationError> {
    let client = GeminiClient::from_env()?;
    client.generate(prompt).await
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`Generator`] doubles shared by the unit tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::{GenerateFuture, GenerationError, Generator};

    /// Replays a fixed sequence of generation results, one per call, and
    /// records every prompt it receives. Panics when called more times than
    /// results were scripted.
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new<I>(replies: I) -> Self
        where
            I: IntoIterator<Item = Result<String, GenerationError>>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Script a single successful reply.
        pub(crate) fn replying(text: &str) -> Self {
            Self::new([Ok(text.to_string())])
        }

        /// Script a single failure.
        pub(crate) fn failing(err: GenerationError) -> Self {
            Self::new([Err(err)])
        }

        /// Prompts seen so far, in call order.
        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub(crate) fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> GenerateFuture<'_> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("ScriptedGenerator called more times than scripted");
            Box::pin(async move { reply })
        }
    }
}

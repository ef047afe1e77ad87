//! Time-locked study sessions keyed by caller identity.
//!
//! [`SessionLockManager`] owns every active session. Starting a session
//! generates a verification question from the study text and keeps the
//! reference answer server-side; callers only ever see the question. An
//! unlock attempt is scored by [`matching`] and removes the session on
//! success, so each question is answerable exactly once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::filters::time_blocking;
use crate::matching;
use crate::text;
use crate::time::Clock;
use crate::{GenerationError, Generator};

/// Session length applied when the caller does not pick one.
pub const DEFAULT_SESSION_MINUTES: u32 = 30;

// ── Types ──────────────────────────────────────────────────────────

/// Opaque per-caller key. The web layer derives one from a cookie;
/// embedders may use any stable string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One active study session. The reference answer stays in this record
/// and is never part of an API payload.
#[derive(Debug, Clone)]
pub struct StudySession {
    pub study_text: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub unlock_question: String,
    pub unlock_answer: String,
}

/// Returned by [`SessionLockManager::start_session`]. Carries the question
/// but not the answer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStart {
    pub question: String,
    pub duration_minutes: u32,
    pub recommended_end: DateTime<Utc>,
}

/// Session operations that can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no study text provided")]
    EmptyStudyText,
    #[error("session duration must be at least one minute")]
    InvalidDuration,
    #[error("no active study session")]
    NoActiveSession,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

// ── Manager ────────────────────────────────────────────────────────

/// Keyed map of active sessions plus the generator used to mint unlock
/// questions.
///
/// All methods take `&self`. The map sits behind a mutex that is never
/// held across an await, so one manager serves concurrent handlers.
pub struct SessionLockManager {
    generator: Arc<dyn Generator>,
    clock: Clock,
    sessions: Mutex<HashMap<SessionId, StudySession>>,
}

impl SessionLockManager {
    pub fn new(generator: Arc<dyn Generator>, clock: Clock) -> Self {
        Self {
            generator,
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or restart) the session for `id`.
    ///
    /// Generates a verification question from `study_text`, records the
    /// session, and returns the question with the planned end time. A prior
    /// session under the same key is replaced. Generation failure leaves
    /// any prior session untouched.
    pub async fn start_session(
        &self,
        id: &SessionId,
        study_text: &str,
        duration_minutes: Option<u32>,
    ) -> Result<SessionStart, SessionError> {
        let study_text = text::normalized(study_text).ok_or(SessionError::EmptyStudyText)?;
        let minutes = duration_minutes.unwrap_or(DEFAULT_SESSION_MINUTES);
        if minutes == 0 {
            return Err(SessionError::InvalidDuration);
        }

        let quiz =
            time_blocking::generate_unlock_question(self.generator.as_ref(), study_text).await?;

        let started_at = self.clock.now();
        let start = SessionStart {
            question: quiz.question.clone(),
            duration_minutes: minutes,
            recommended_end: started_at + Duration::minutes(i64::from(minutes)),
        };
        let session = StudySession {
            study_text: study_text.to_string(),
            started_at,
            duration_minutes: minutes,
            unlock_question: quiz.question,
            unlock_answer: quiz.answer,
        };

        info!("study session started: id={id}, duration={minutes}m");
        self.sessions.lock().unwrap().insert(id.clone(), session);
        Ok(start)
    }

    /// Score an unlock attempt against the active session for `id`.
    ///
    /// `Ok(true)` removes the session; `Ok(false)` leaves it active with the
    /// same question. A missing session is an error, not a miss, so callers
    /// can tell "wrong answer" from "nothing to unlock".
    pub fn check_unlock(&self, id: &SessionId, answer: &str) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get(id).ok_or(SessionError::NoActiveSession)?;
        let correct = matching::is_match(answer, &session.unlock_answer);
        if correct {
            sessions.remove(id);
            info!("session unlocked: id={id}");
        } else {
            debug!("unlock attempt rejected: id={id}");
        }
        Ok(correct)
    }

    /// Whether `id` currently has an active session.
    pub fn has_active_session(&self, id: &SessionId) -> bool {
        self.sessions.lock().unwrap().contains_key(id)
    }
}

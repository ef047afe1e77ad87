//! JSON endpoint handlers.
//!
//! Every body in and out is JSON. Success payloads carry `"success": true`;
//! failures carry `"error"` plus a status that says whose fault it was:
//! 400 for bad input, 503 when no API key is configured, 502 when the
//! upstream generation call fails.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spectra_core::filters::{FilterError, memory};
use spectra_core::session::SessionError;
use spectra_core::text;
use spectra_core::{FilterKind, FilterOutput, FilterSet, GenerationError, SessionLockManager};
use tracing::warn;

use crate::identity::Identity;
use crate::pdf;

/// Filter applied when the request names none.
const DEFAULT_FILTER: &str = "blue";
/// Memory-filter mode applied when the request names none.
const DEFAULT_MODE: &str = "normal";

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub filters: Arc<FilterSet>,
    pub sessions: Arc<SessionLockManager>,
}

// ── Error mapping ──────────────────────────────────────────────────

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn generation_error(err: &GenerationError) -> Response {
    let status = match err {
        GenerationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_body(status, &err.to_string())
}

fn session_error(err: SessionError) -> Response {
    match err {
        SessionError::EmptyStudyText => error_body(StatusCode::BAD_REQUEST, "No text provided"),
        SessionError::InvalidDuration => error_body(StatusCode::BAD_REQUEST, &err.to_string()),
        SessionError::NoActiveSession => {
            error_body(StatusCode::BAD_REQUEST, "No active study session")
        }
        SessionError::Generation(err) => {
            warn!("unlock question generation failed: {err}");
            generation_error(&err)
        }
    }
}

// ── /apply_filter ──────────────────────────────────────────────────

/// Request body for POST /apply_filter.
#[derive(Deserialize)]
pub struct ApplyFilterRequest {
    pub text: Option<String>,
    pub filter: Option<String>,
    pub mode: Option<String>,
}

/// Response body for POST /apply_filter.
#[derive(Serialize)]
pub struct ApplyFilterResponse {
    pub success: bool,
    pub filter: FilterKind,
    pub result: FilterOutput,
}

/// POST /apply_filter — Run one filter over the supplied text.
///
/// `filter` defaults to `blue` and `mode` to `normal`; `mode` only matters
/// to the memory filter. The filter's output comes back under `result`
/// with the tag echoed beside it.
pub async fn apply_filter(
    State(app): State<AppState>,
    body: Option<Json<ApplyFilterRequest>>,
) -> Response {
    let Some(Json(req)) = body else {
        return error_body(StatusCode::BAD_REQUEST, "No text provided");
    };
    let Some(text) = req.text.as_deref().and_then(text::normalized) else {
        return error_body(StatusCode::BAD_REQUEST, "No text provided");
    };
    let tag = req.filter.as_deref().unwrap_or(DEFAULT_FILTER);
    let Some(kind) = FilterKind::from_tag(tag) else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid filter");
    };
    let mode = req.mode.as_deref().unwrap_or(DEFAULT_MODE);

    match app.filters.apply(kind, text, mode).await {
        Ok(result) => Json(ApplyFilterResponse {
            success: true,
            filter: kind,
            result,
        })
        .into_response(),
        Err(FilterError::NotRegistered(_)) => error_body(StatusCode::BAD_REQUEST, "Invalid filter"),
        Err(FilterError::Generation(err)) => {
            warn!("filter {kind} failed: {err}");
            generation_error(&err)
        }
    }
}

// ── /start_study_session + /check_unlock ───────────────────────────

/// Request body for POST /start_study_session.
#[derive(Deserialize)]
pub struct StartSessionRequest {
    pub text: Option<String>,
    /// Minutes. Server default applies when absent.
    pub duration: Option<u32>,
}

/// Response body for POST /start_study_session.
#[derive(Serialize)]
pub struct StartSessionResponse {
    pub success: bool,
    pub question: String,
    pub duration: u32,
    pub end_time: DateTime<Utc>,
}

/// POST /start_study_session — Lock in a study session for this caller.
///
/// Generates an unlock question from the study text and stores it against
/// the caller's cookie identity; the reference answer never leaves the
/// server. Calling again replaces any session the caller already holds.
pub async fn start_study_session(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<StartSessionRequest>>,
) -> Response {
    let identity = Identity::from_headers(&headers);
    let (text, duration) = match body {
        Some(Json(req)) => (req.text.unwrap_or_default(), req.duration),
        None => (String::new(), None),
    };

    let mut response = match app.sessions.start_session(&identity.id, &text, duration).await {
        Ok(start) => Json(StartSessionResponse {
            success: true,
            question: start.question,
            duration: start.duration_minutes,
            end_time: start.recommended_end,
        })
        .into_response(),
        Err(err) => session_error(err),
    };
    identity.apply(&mut response);
    response
}

/// Request body for POST /check_unlock.
#[derive(Deserialize)]
pub struct CheckUnlockRequest {
    pub answer: Option<String>,
}

/// Response body for POST /check_unlock.
#[derive(Serialize)]
pub struct CheckUnlockResponse {
    pub success: bool,
    pub correct: bool,
    pub message: &'static str,
}

/// POST /check_unlock — Score an unlock attempt for this caller.
///
/// A correct answer releases the lock; a wrong one leaves the session
/// active for another try. No active session is an error, not a miss, so
/// the frontend can distinguish the two.
pub async fn check_unlock(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<CheckUnlockRequest>>,
) -> Response {
    let identity = Identity::from_headers(&headers);
    let answer = body.and_then(|Json(req)| req.answer).unwrap_or_default();

    let mut response = match app.sessions.check_unlock(&identity.id, &answer) {
        Ok(correct) => Json(CheckUnlockResponse {
            success: true,
            correct,
            message: if correct {
                "Correct! Session unlocked."
            } else {
                "Incorrect. Keep studying!"
            },
        })
        .into_response(),
        Err(err) => session_error(err),
    };
    identity.apply(&mut response);
    response
}

// ── /get_hint ──────────────────────────────────────────────────────

/// Request body for POST /get_hint.
#[derive(Deserialize)]
pub struct HintRequest {
    pub word: Option<String>,
}

/// Response body for POST /get_hint.
#[derive(Serialize)]
pub struct HintResponse {
    pub success: bool,
    pub hint: String,
}

/// POST /get_hint — First-letter hint for a fill-in blank.
///
/// Purely local; no generation call is involved.
pub async fn get_hint(body: Option<Json<HintRequest>>) -> Json<HintResponse> {
    let word = body.and_then(|Json(req)| req.word).unwrap_or_default();
    Json(HintResponse {
        success: true,
        hint: memory::hint_for(&word),
    })
}

// ── /extract_pdf ───────────────────────────────────────────────────

/// Response body for POST /extract_pdf.
#[derive(Serialize)]
pub struct ExtractPdfResponse {
    pub success: bool,
    pub text: String,
}

/// POST /extract_pdf — Pull the text out of an uploaded PDF.
///
/// Expects a multipart form with a `file` part. Anything that stops
/// extraction, from a missing part to an unparsable document, comes back
/// as a 400 with the reason.
pub async fn extract_pdf(mut multipart: Multipart) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                if field.file_name().is_none_or(str::is_empty) {
                    return error_body(StatusCode::BAD_REQUEST, "No selected file");
                }
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some(bytes);
                        break;
                    }
                    Err(err) => return error_body(StatusCode::BAD_REQUEST, &err.to_string()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => return error_body(StatusCode::BAD_REQUEST, &err.to_string()),
        }
    }
    let Some(bytes) = upload else {
        return error_body(StatusCode::BAD_REQUEST, "No file part");
    };

    match pdf::extract_text(&bytes) {
        Ok(text) => Json(ExtractPdfResponse {
            success: true,
            text,
        })
        .into_response(),
        Err(err) => error_body(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

// ── /healthz ───────────────────────────────────────────────────────

/// GET /healthz — Liveness probe.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

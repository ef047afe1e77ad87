//! Cookie-based caller identity.
//!
//! Study sessions are keyed per caller. The key is an opaque UUID carried in
//! a `spectra_sid` cookie, minted on first contact; no account data is ever
//! attached to it.

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use spectra_core::SessionId;
use uuid::Uuid;

/// Name of the cookie carrying the caller's session key.
pub const SESSION_COOKIE: &str = "spectra_sid";

/// Resolved caller identity for one request.
pub struct Identity {
    pub id: SessionId,
    /// True when the id was minted for this request and the cookie still
    /// has to be handed to the caller.
    pub fresh: bool,
}

impl Identity {
    /// Identity from request headers, minting a new id when no session
    /// cookie is present.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers) {
            Some(id) => Self {
                id: SessionId::from(id),
                fresh: false,
            },
            None => Self {
                id: SessionId::from(Uuid::new_v4().to_string()),
                fresh: true,
            },
        }
    }

    /// Attach the `Set-Cookie` header for a freshly minted id. Does nothing
    /// for an id the caller already holds.
    pub fn apply(&self, response: &mut Response) {
        if !self.fresh {
            return;
        }
        let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
}

/// The session cookie value from the request, if any.
fn cookie_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

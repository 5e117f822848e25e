//! Per-request annotations shared across the middleware stack.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::domain::user::User;
use crate::error::AppError;

/// Facts recorded about a request as it passes through the middleware stack.
///
/// Inserted into the request extensions by
/// [`crate::api::middleware::received_at::layer`]. Clones share the same
/// underlying record, so values set by an inner layer are visible to an outer
/// layer after the inner service returns.
///
/// Everything except `received_at` is written at most once and may never be
/// written at all if the corresponding layer is not mounted. Readers must treat
/// an unset value as "not known" rather than as an error.
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    received_at: DateTime<Utc>,
    request_id: OnceLock<String>,
    logging_start: OnceLock<Instant>,
    user: OnceLock<User>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new() -> Self {
        Self::received(Utc::now())
    }

    /// Creates a context stamped with the given time.
    pub fn received(received_at: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                received_at,
                request_id: OnceLock::new(),
                logging_start: OnceLock::new(),
                user: OnceLock::new(),
            }),
        }
    }

    /// When the request entered the application.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.inner.received_at
    }

    pub fn request_id(&self) -> Option<&str> {
        self.inner.request_id.get().map(String::as_str)
    }

    /// Records the request id. Returns `false` if one was already set.
    pub fn set_request_id(&self, id: String) -> bool {
        self.inner.request_id.set(id).is_ok()
    }

    pub fn logging_start(&self) -> Option<Instant> {
        self.inner.logging_start.get().copied()
    }

    pub fn set_logging_start(&self, start: Instant) -> bool {
        self.inner.logging_start.set(start).is_ok()
    }

    pub fn user(&self) -> Option<&User> {
        self.inner.user.get()
    }

    /// Records the resolved user. Returns `false` if one was already set.
    pub fn set_user(&self, user: User) -> bool {
        self.inner.user.set(user).is_ok()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestContext>().cloned().ok_or_else(|| {
            AppError::internal(
                "Request context unavailable",
                serde_json::json!({"reason": "received_at layer is not mounted"}),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_start_unset() {
        let ctx = RequestContext::new();

        assert!(ctx.request_id().is_none());
        assert!(ctx.logging_start().is_none());
        assert!(ctx.user().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = RequestContext::new();
        let outer = ctx.clone();

        assert!(ctx.set_request_id("abc".to_string()));
        assert!(ctx.set_user(User::Anonymous));

        assert_eq!(outer.request_id(), Some("abc"));
        assert_eq!(outer.user(), Some(&User::Anonymous));
    }

    #[test]
    fn test_values_are_written_once() {
        let ctx = RequestContext::new();

        assert!(ctx.set_request_id("first".to_string()));
        assert!(!ctx.set_request_id("second".to_string()));
        assert_eq!(ctx.request_id(), Some("first"));
    }

    #[test]
    fn test_received_at_is_preserved() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(RequestContext::received(at).received_at(), at);
    }
}

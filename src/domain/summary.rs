//! Access summary record emitted once per request.

use serde::Serialize;

/// One line of the access summary log.
///
/// The first six fields are always present. `uid`, `rid` and `t` are only
/// known when the layers that record them ran for this request, and are left
/// out of the serialized record otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub errno: u32,
    pub agent: String,
    pub lang: String,
    pub method: String,
    pub path: String,
    pub code: u16,

    /// User id, or an empty string for an anonymous user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    /// Time spent handling the request, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<u64>,
}

/// Destination for access summaries.
///
/// # Implementations
///
/// - [`crate::infrastructure::summary::TracingSummarySink`] - emits a `tracing` event
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
pub trait RequestSummarySink: Send + Sync {
    fn emit(&self, summary: &RequestSummary);
}

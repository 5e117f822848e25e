//! Access summaries as `tracing` events.

use crate::domain::summary::{RequestSummary, RequestSummarySink};

/// Event target for access summaries, so they can be filtered separately
/// (e.g. `RUST_LOG=info,request.summary=off`).
pub const SUMMARY_TARGET: &str = "request.summary";

/// Emits each summary as one `INFO` event with target [`SUMMARY_TARGET`].
///
/// Unset optional fields are recorded as absent, not as empty values.
///
/// # Example Logs
///
/// ```text
/// INFO request.summary: errno=0 agent="curl/8.4.0" lang="" method="GET" path="/__version__/" code=200 rid="5f0c…" t=1
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSummarySink;

impl RequestSummarySink for TracingSummarySink {
    fn emit(&self, summary: &RequestSummary) {
        tracing::info!(
            target: SUMMARY_TARGET,
            errno = summary.errno,
            agent = %summary.agent,
            lang = %summary.lang,
            method = %summary.method,
            path = %summary.path,
            code = summary.code,
            uid = summary.uid.as_deref(),
            rid = summary.rid.as_deref(),
            t = summary.t
        );
    }
}

//! Access summary logging.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::domain::context::RequestContext;
use crate::domain::summary::RequestSummary;
use crate::state::AppState;

/// Emits one [`RequestSummary`] per request through the configured sink.
///
/// # Behavior
///
/// **On Request:**
/// - Records a fresh request id and the logging start time on the
///   [`RequestContext`], if one is present
///
/// **On Response:**
/// - Builds the summary from the request line, the `User-Agent` and
///   `Accept-Language` headers, the response status, and whatever the
///   context knows (request id, elapsed time, resolved user)
/// - Hands it to [`AppState::summary_sink`]
///
/// Context values that were never recorded are left out of the summary. This
/// happens when the layer runs without [`super::received_at::layer`] in front
/// of it, or when no identity layer resolved a user.
///
/// # Integration
///
/// ```rust,ignore
/// let app = router
///     .layer(middleware::from_fn_with_state(state.clone(), request_summary::layer))
///     .layer(middleware::from_fn(received_at::layer));
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let context = req.extensions().get::<RequestContext>().cloned();
    if let Some(ctx) = &context {
        ctx.set_request_id(Uuid::new_v4().simple().to_string());
        ctx.set_logging_start(Instant::now());
    }

    let line = RequestLine::from_request(&req);

    let response = next.run(req).await;

    let summary = build_summary(line, context.as_ref(), response.status());
    st.summary_sink.emit(&summary);

    response
}

/// The parts of the request the summary needs, captured before the request
/// is handed on.
struct RequestLine {
    agent: String,
    lang: String,
    method: String,
    path: String,
}

impl RequestLine {
    fn from_request(req: &Request) -> Self {
        Self {
            agent: header_or_empty(req.headers(), &header::USER_AGENT),
            lang: header_or_empty(req.headers(), &header::ACCEPT_LANGUAGE),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
        }
    }
}

fn header_or_empty(headers: &HeaderMap, name: &HeaderName) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}

fn build_summary(
    line: RequestLine,
    context: Option<&RequestContext>,
    status: StatusCode,
) -> RequestSummary {
    let uid = context
        .and_then(RequestContext::user)
        .map(|user| user.id().map(|id| id.to_string()).unwrap_or_default());
    let rid = context
        .and_then(RequestContext::request_id)
        .map(str::to_string);
    let t = context
        .and_then(RequestContext::logging_start)
        .map(|start| start.elapsed().as_millis() as u64);

    RequestSummary {
        errno: 0,
        agent: line.agent,
        lang: line.lang,
        method: line.method,
        path: line.path,
        code: status.as_u16(),
        uid,
        rid,
        t,
    }
}

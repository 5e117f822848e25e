//! Stamps each request with the time it entered the application.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::domain::context::RequestContext;

/// Inserts a [`RequestContext`] whose `received_at` is the current time.
///
/// Must be the outermost layer so the timestamp is taken before any other
/// middleware runs. A context that is already present is left untouched,
/// keeping the earliest timestamp if the layer is mounted twice.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(index))
///     .layer(middleware::from_fn(received_at::layer));
/// ```
pub async fn layer(mut req: Request, next: Next) -> Response {
    if req.extensions().get::<RequestContext>().is_none() {
        req.extensions_mut().insert(RequestContext::new());
    }

    next.run(req).await
}

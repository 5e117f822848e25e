//! Trailing-slash correction with cacheable redirects.

use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::responses::CachedPermanentRedirect;
use crate::state::AppState;
use crate::utils::route_table::RouteTable;

/// Redirects `404`s to the slash-terminated path when that path exists.
///
/// # Behavior
///
/// Only applies when `APPEND_SLASH` is enabled, the inner service answered
/// `404 Not Found`, and [`slash_redirect_target`] finds a target. The redirect
/// is a [`CachedPermanentRedirect`] with `max-age=<PERMANENT_REDIRECT_CACHE_TIME>`.
/// Any other response passes through untouched.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    if !st.config.append_slash {
        return next.run(req).await;
    }

    let uri = req.uri().clone();
    let response = next.run(req).await;

    if response.status() != StatusCode::NOT_FOUND {
        return response;
    }

    let Some(target) = slash_redirect_target(&st.routes, &uri) else {
        return response;
    };

    match CachedPermanentRedirect::new(&target, st.config.permanent_redirect_cache_time) {
        Ok(redirect) => {
            debug!(from = uri.path(), to = %target, "Appending slash");
            redirect.into_response()
        }
        Err(_) => response,
    }
}

/// Where to send a request whose path is missing its trailing slash.
///
/// Returns `None` unless the path does not end in `/`, does not resolve as
/// is, and resolves once `/` is appended. The query string is kept. A target
/// starting with `//` has its second slash escaped so it cannot be read as a
/// protocol-relative URL.
pub fn slash_redirect_target(routes: &RouteTable, uri: &Uri) -> Option<String> {
    let path = uri.path();
    if path.ends_with('/') || routes.resolves(path) {
        return None;
    }

    let with_slash = format!("{path}/");
    if !routes.resolves(&with_slash) {
        return None;
    }

    let mut target = match with_slash.strip_prefix("//") {
        Some(rest) => format!("/%2F{rest}"),
        None => with_slash,
    };
    if let Some(query) = uri.query() {
        target.push('?');
        target.push_str(query);
    }

    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> RouteTable {
        RouteTable::new(["/api/v1/", "/api/v1/recipe/{id}/"])
    }

    #[test]
    fn test_target_for_known_route() {
        let uri: Uri = "/api/v1".parse().unwrap();

        assert_eq!(
            slash_redirect_target(&RouteTable::new(["/api/v1/"]), &uri).as_deref(),
            Some("/api/v1/")
        );
    }

    #[test]
    fn test_target_keeps_query() {
        let uri: Uri = "/api/v1/recipe/4?format=json".parse().unwrap();

        assert_eq!(
            slash_redirect_target(&routes(), &uri).as_deref(),
            Some("/api/v1/recipe/4/?format=json")
        );
    }

    #[test]
    fn test_no_target_when_slash_present() {
        let uri: Uri = "/api/v1/".parse().unwrap();

        assert!(slash_redirect_target(&routes(), &uri).is_none());
    }

    #[test]
    fn test_no_target_for_unknown_route() {
        let uri: Uri = "/nope".parse().unwrap();

        assert!(slash_redirect_target(&RouteTable::new(["/api/v1/"]), &uri).is_none());
    }

    #[test]
    fn test_no_target_when_path_resolves() {
        let table = RouteTable::new(["/api/v1", "/api/v1/"]);
        let uri: Uri = "/api/v1".parse().unwrap();

        assert!(slash_redirect_target(&table, &uri).is_none());
    }

    #[test]
    fn test_leading_double_slash_is_escaped() {
        let table = RouteTable::new(["//evil.example.com/"]);
        let uri: Uri = "//evil.example.com".parse().unwrap();

        assert_eq!(
            slash_redirect_target(&table, &uri).as_deref(),
            Some("/%2Fevil.example.com/")
        );
    }
}

//! Cache headers for static files, with cache-forever for content-hashed names.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use regex::Regex;
use std::sync::LazyLock;

use crate::config::Config;
use crate::state::AppState;
use crate::utils::cache_control::{CacheDirectives, patch_cache_control};

/// Ten years, the conventional "forever" for immutable assets.
pub const FOREVER: u64 = 10 * 365 * 24 * 60 * 60;

/// A run of exactly 20 or exactly 32 lowercase hex digits right before the
/// extension. The run is either the whole stem or follows a non-hex character.
///
/// - 20 digits: bundler output named `[name].[hash].[ext]` (JS, CSS)
/// - 32 digits: content-addressed files named `[hash].[ext]` (images, fonts)
static HASHED_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*[^a-f0-9])?(?:[a-f0-9]{20}|[a-f0-9]{32})\.\w+$").unwrap()
});

/// How static file responses are cached.
#[derive(Debug, Clone)]
pub struct StaticCachePolicy {
    prefix: String,
    max_age: u64,
}

impl StaticCachePolicy {
    pub fn new(prefix: impl Into<String>, max_age: u64) -> Self {
        Self {
            prefix: prefix.into(),
            max_age,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.static_url.clone(), config.static_max_age)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `url` names an immutable file: one carrying a hash of
    /// its contents in its name, so the bytes behind that name never change
    /// and can be cached forever.
    ///
    /// URLs outside the static prefix are never immutable.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let policy = StaticCachePolicy::new("/static/", 60);
    ///
    /// assert!(policy.is_immutable_file("/static/app.a1b2c3d4e5f6a1b2c3d4.js"));
    /// assert!(!policy.is_immutable_file("/static/app.js"));
    /// assert!(!policy.is_immutable_file("/other/app.a1b2c3d4e5f6a1b2c3d4.js"));
    /// ```
    pub fn is_immutable_file(&self, url: &str) -> bool {
        if !url.starts_with(&self.prefix) {
            return false;
        }
        let filename = url.rsplit('/').next().unwrap_or(url);
        HASHED_FILENAME.is_match(filename)
    }

    /// Cache directives for a static file served at `url`.
    pub fn directives_for(&self, url: &str) -> CacheDirectives {
        if self.is_immutable_file(url) {
            CacheDirectives {
                immutable: true,
                ..CacheDirectives::public_max_age(FOREVER)
            }
        } else {
            CacheDirectives::public_max_age(self.max_age)
        }
    }
}

/// Adds `Cache-Control` and `Access-Control-Allow-Origin: *` to successful
/// responses under the static prefix.
///
/// # Headers
///
/// - Immutable files: `public, max-age=315360000, immutable`
/// - Other files: `public, max-age=<STATIC_MAX_AGE>`
///
/// Only `2xx` and `304 Not Modified` responses are annotated, and a
/// `Cache-Control` header set further in is kept as is.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !path.starts_with(st.static_cache.prefix()) {
        return next.run(req).await;
    }

    let mut response = next.run(req).await;

    let status = response.status();
    if !(status.is_success() || status == StatusCode::NOT_MODIFIED) {
        return response;
    }

    let headers = response.headers_mut();
    if !headers.contains_key(header::CACHE_CONTROL) {
        patch_cache_control(headers, st.static_cache.directives_for(&path));
    }
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("*"));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::MockRequestSummarySink;
    use crate::domain::user::MockUserDirectory;
    use crate::utils::route_table::RouteTable;
    use axum::{Router, body::Body, middleware, routing::get};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn policy() -> StaticCachePolicy {
        StaticCachePolicy::new("/static/", 60)
    }

    #[test]
    fn test_named_hash_is_immutable() {
        assert!(policy().is_immutable_file("/static/app.a1b2c3d4e5f6a1b2c3d4.js"));
        assert!(policy().is_immutable_file("/static/bundles/vendor.0123456789abcdef0123.css"));
    }

    #[test]
    fn test_content_addressed_is_immutable() {
        assert!(policy().is_immutable_file("/static/0123456789abcdef0123456789abcdef.png"));
        assert!(policy().is_immutable_file("/static/fonts/fedcba9876543210fedcba9876543210.woff2"));
    }

    #[test]
    fn test_plain_names_are_not_immutable() {
        assert!(!policy().is_immutable_file("/static/app.js"));
        assert!(!policy().is_immutable_file("/static/"));
        assert!(!policy().is_immutable_file("/static/a1b2c3d4e5f6a1b2c3d4"));
    }

    #[test]
    fn test_other_hex_lengths_are_not_immutable() {
        for len in [8, 16, 19, 21, 25, 31, 33, 40] {
            let hash: String = "0123456789abcdef".chars().cycle().take(len).collect();
            let named = format!("/static/app.{hash}.js");
            let addressed = format!("/static/{hash}.png");

            assert!(!policy().is_immutable_file(&named), "{named}");
            assert!(!policy().is_immutable_file(&addressed), "{addressed}");
        }
    }

    #[test]
    fn test_uppercase_hex_is_not_immutable() {
        assert!(!policy().is_immutable_file("/static/app.A1B2C3D4E5F6A1B2C3D4.js"));
    }

    #[test]
    fn test_outside_prefix_is_not_immutable() {
        assert!(!policy().is_immutable_file("/other/app.a1b2c3d4e5f6a1b2c3d4.js"));
        assert!(!policy().is_immutable_file("/staticfiles/app.a1b2c3d4e5f6a1b2c3d4.js"));
    }

    #[test]
    fn test_directives_for() {
        let immutable = policy().directives_for("/static/app.a1b2c3d4e5f6a1b2c3d4.js");
        assert!(immutable.immutable);
        assert_eq!(immutable.max_age, Some(FOREVER));

        let plain = policy().directives_for("/static/app.js");
        assert!(!plain.immutable);
        assert_eq!(plain.max_age, Some(60));
        assert!(plain.public);
    }

    fn app() -> Router {
        let st = AppState::with_collaborators(
            Config::default(),
            RouteTable::default(),
            Arc::new(MockRequestSummarySink::new()),
            Arc::new(MockUserDirectory::new()),
        )
        .unwrap();

        Router::new()
            .route("/static/app.js", get(|| async { StatusCode::NOT_MODIFIED }))
            .route(
                "/static/app.a1b2c3d4e5f6a1b2c3d4.js",
                get(|| async { StatusCode::NOT_MODIFIED }),
            )
            .route(
                "/static/live.js",
                get(|| async { ([(header::CACHE_CONTROL, "no-cache")], "live") }),
            )
            .route("/static/broken.js", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .layer(middleware::from_fn_with_state(st, layer))
    }

    async fn get_path(path: &str) -> Response {
        app()
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_not_modified_gets_cache_headers() {
        let response = get_path("/static/app.js").await;

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=60");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let response = get_path("/static/app.a1b2c3d4e5f6a1b2c3d4.js").await;

        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=315360000, immutable"
        );
    }

    #[tokio::test]
    async fn test_existing_cache_control_is_kept() {
        let response = get_path("/static/live.js").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_error_responses_are_untouched() {
        let response = get_path("/static/broken.js").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}

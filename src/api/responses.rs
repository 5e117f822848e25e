//! Redirect responses produced by the middleware stack.

use axum::{
    http::{HeaderValue, StatusCode, header, header::InvalidHeaderValue},
    response::{IntoResponse, Response},
};

use crate::utils::cache_control::{CacheDirectives, patch_cache_control};

/// `301 Moved Permanently` to a fixed location.
///
/// axum's own [`axum::response::Redirect::permanent`] answers `308`, which
/// would also tell clients to repeat the method and body; these redirects are
/// plain `301`s.
#[derive(Debug, Clone)]
pub struct PermanentRedirect {
    location: HeaderValue,
}

impl PermanentRedirect {
    /// # Errors
    ///
    /// Fails if `location` is not a valid header value.
    pub fn to(location: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            location: HeaderValue::try_from(location)?,
        })
    }

    pub fn location(&self) -> &str {
        self.location.to_str().unwrap_or_default()
    }

    /// Marks the redirect as publicly cacheable for `max_age` seconds.
    pub fn cached(self, max_age: u64) -> CachedPermanentRedirect {
        CachedPermanentRedirect {
            redirect: self,
            max_age,
        }
    }
}

impl IntoResponse for PermanentRedirect {
    fn into_response(self) -> Response {
        (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, self.location)],
        )
            .into_response()
    }
}

/// A [`PermanentRedirect`] that also carries `Cache-Control: public, max-age=<N>`.
#[derive(Debug, Clone)]
pub struct CachedPermanentRedirect {
    redirect: PermanentRedirect,
    max_age: u64,
}

impl CachedPermanentRedirect {
    pub fn new(location: &str, max_age: u64) -> Result<Self, InvalidHeaderValue> {
        Ok(PermanentRedirect::to(location)?.cached(max_age))
    }

    pub fn location(&self) -> &str {
        self.redirect.location()
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }
}

impl IntoResponse for CachedPermanentRedirect {
    fn into_response(self) -> Response {
        let mut response = self.redirect.into_response();
        patch_cache_control(
            response.headers_mut(),
            CacheDirectives::public_max_age(self.max_age),
        );
        response
    }
}

//! HTTP to HTTPS upgrade redirects, cached and logged.

use anyhow::Context;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Uri, uri::Scheme},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use regex::Regex;
use serde_json::{Value, json};
use tracing::{Level, debug, warn};

use crate::api::responses::PermanentRedirect;
use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_meta::{full_path, http_headers, request_host};

/// Diagnostic code on the debug event logged for each upgrade redirect.
pub const DEBUG_HTTP_TO_HTTPS_REDIRECT: &str = "recipe_edge::security::D001";

/// Upper bound on the request body buffered for the redirect log entry.
///
/// Longer bodies are logged up to this many bytes and flagged as truncated.
pub const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

/// When and where plain HTTP requests are redirected to HTTPS.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    redirect: bool,
    redirect_host: Option<String>,
    redirect_exempt: Vec<Regex>,
    proxy_ssl_header: Option<(HeaderName, HeaderValue)>,
    cache_time: u64,
}

impl SecurityPolicy {
    /// # Errors
    ///
    /// Fails if an exempt pattern or the proxy SSL header cannot be parsed.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            redirect: config.secure_ssl_redirect,
            redirect_host: config.secure_ssl_host.clone(),
            redirect_exempt: config
                .exempt_patterns()
                .context("invalid SECURE_REDIRECT_EXEMPT pattern")?,
            proxy_ssl_header: config
                .proxy_ssl_header()
                .context("invalid SECURE_PROXY_SSL_HEADER")?,
            cache_time: config.https_redirect_cache_time,
        })
    }

    /// `max-age` applied to upgrade redirects.
    pub fn cache_time(&self) -> u64 {
        self.cache_time
    }

    /// Returns true if the request arrived over TLS.
    ///
    /// With a proxy SSL header configured and present on the request, its
    /// first comma-separated value decides. Otherwise the URI scheme does.
    pub fn is_secure(&self, headers: &HeaderMap, uri: &Uri) -> bool {
        if let Some((name, expected)) = &self.proxy_ssl_header
            && let Some(value) = headers.get(name)
        {
            let first = value
                .to_str()
                .ok()
                .and_then(|v| v.split(',').next())
                .map(str::trim);
            return first.is_some_and(|v| v.as_bytes() == expected.as_bytes());
        }

        uri.scheme() == Some(&Scheme::HTTPS)
    }

    /// The upgrade decision: a redirect to the same path over HTTPS, or
    /// `None` to let the request through.
    ///
    /// Paths matching an exempt pattern (tested without the leading `/`) are
    /// never redirected.
    ///
    /// # Errors
    ///
    /// Returns `400 Bad Request` when no redirect host is configured and the
    /// request has no usable `Host`.
    pub fn https_redirect(
        &self,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Result<Option<PermanentRedirect>, AppError> {
        if !self.redirect || self.is_secure(headers, uri) {
            return Ok(None);
        }

        let path = uri.path().trim_start_matches('/');
        if self.redirect_exempt.iter().any(|p| p.is_match(path)) {
            return Ok(None);
        }

        let host = match &self.redirect_host {
            Some(host) => host.clone(),
            None => request_host(headers, uri).ok_or_else(|| {
                AppError::bad_request("Missing Host header", json!({}))
            })?,
        };

        let location = format!("https://{}{}", host, full_path(uri));
        let redirect = PermanentRedirect::to(&location).map_err(|_| {
            AppError::bad_request("Invalid redirect location", json!({ "host": host }))
        })?;

        Ok(Some(redirect))
    }
}

/// Redirects insecure requests to HTTPS and logs each redirect.
///
/// # Behavior
///
/// When [`SecurityPolicy::https_redirect`] decides to redirect:
/// 1. `Cache-Control: public, max-age=<HTTPS_REDIRECT_CACHE_TIME>` is added
/// 2. A `DEBUG` event is logged with the diagnostic code
///    [`DEBUG_HTTP_TO_HTTPS_REDIRECT`], the method, the request body (up to
///    [`MAX_LOGGED_BODY_BYTES`], with `body_truncated` set past that), the path,
///    and the request headers keyed in meta form without the `HTTP_` prefix
///
/// Otherwise the request continues unchanged. The body is only read when
/// `DEBUG` is enabled.
///
/// # Example Logs
///
/// ```text
/// DEBUG Served HTTP to HTTPS redirect for /api/v1/ code="recipe_edge::security::D001" method=GET body= body_truncated=false path=/api/v1/ headers={"HOST":"example.com"}
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(redirect) = st.security.https_redirect(req.headers(), req.uri())? else {
        return Ok(next.run(req).await);
    };

    if tracing::enabled!(Level::DEBUG) {
        let (parts, body) = req.into_parts();

        let (body, body_truncated) = body_prefix(body, MAX_LOGGED_BODY_BYTES).await;

        let headers: Value = Value::Object(
            http_headers(&parts.headers)
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        );

        let path = parts.uri.path();
        debug!(
            code = DEBUG_HTTP_TO_HTTPS_REDIRECT,
            method = %parts.method,
            body = %body,
            body_truncated,
            path = %path,
            headers = %headers,
            "Served HTTP to HTTPS redirect for {}",
            path
        );
    }

    Ok(redirect.cached(st.security.cache_time()).into_response())
}

/// Reads at most `limit` bytes of `body`, decoded lossily.
///
/// Returns the text and whether bytes past `limit` were left unread. A body
/// that fails mid-stream yields what was read before the error.
async fn body_prefix(mut body: Body, limit: usize) -> (String, bool) {
    let mut buf: Vec<u8> = Vec::new();
    let mut truncated = false;

    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Request body only partially logged: {}", e);
                break;
            }
        };
        let Ok(data) = frame.into_data() else {
            continue;
        };

        let room = limit - buf.len();
        if data.len() > room {
            buf.extend_from_slice(&data[..room]);
            truncated = true;
            break;
        }
        buf.extend_from_slice(&data);
    }

    (String::from_utf8_lossy(&buf).into_owned(), truncated)
}

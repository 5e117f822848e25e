//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup, validated, and then shared read-only
//! (behind an `Arc`) by every middleware layer.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:8000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `APP_CONFIGURATION` - Configuration name reported by `/__version__/`
//! - `OIDC_REMOTE_AUTH_HEADER` - Header carrying the proxied user identity
//! - `PERMANENT_REDIRECT_CACHE_TIME` - `max-age` for trailing-slash redirects (seconds)
//! - `HTTPS_REDIRECT_CACHE_TIME` - `max-age` for HTTP to HTTPS redirects (seconds)
//! - `STATIC_URL` / `STATIC_ROOT` / `STATIC_MAX_AGE` - Static file serving
//! - `APPEND_SLASH` - Redirect to the slash-terminated path when it resolves
//! - `SECURE_SSL_REDIRECT` / `SECURE_SSL_HOST` / `SECURE_REDIRECT_EXEMPT` /
//!   `SECURE_PROXY_SSL_HEADER` - HTTPS upgrade redirects

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue};
use regex::Regex;
use std::env;
use std::path::PathBuf;

const THIRTY_DAYS: u64 = 60 * 60 * 24 * 30;

/// Errors produced while interpreting header-valued settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid header value in '{0}'")]
    InvalidHeaderValue(String),

    #[error("expected 'Name: value', got '{0}'")]
    MalformedHeaderSpec(String),
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Name of the deployment, reported by the version endpoint.
    pub configuration_name: String,

    /// Header trusted to carry the authenticated username.
    ///
    /// Accepts either a plain header name (`OIDC-Claim-ID-Token-Email`) or the
    /// CGI meta form (`HTTP_OIDC_CLAIM_ID_TOKEN_EMAIL`).
    pub remote_auth_header: String,

    /// `max-age` applied to trailing-slash redirects.
    pub permanent_redirect_cache_time: u64,
    /// `max-age` applied to HTTP to HTTPS redirects.
    pub https_redirect_cache_time: u64,

    // ── Static files ───────────────────────────────────────────────────────
    /// URL prefix static files are served under, with leading and trailing `/`.
    pub static_url: String,
    pub static_root: PathBuf,
    /// `max-age` for static files whose names carry no content hash.
    pub static_max_age: u64,

    pub append_slash: bool,

    // ── HTTPS upgrade ──────────────────────────────────────────────────────
    pub secure_ssl_redirect: bool,
    /// Host to redirect to; the request's `Host` header is used when unset.
    pub secure_ssl_host: Option<String>,
    /// Regexes matched against the path (without its leading `/`).
    pub secure_redirect_exempt: Vec<String>,
    /// `Name: value` pair set by a TLS-terminating proxy on secure requests.
    pub secure_proxy_ssl_header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            configuration_name: "Development".to_string(),
            remote_auth_header: "OIDC-Claim-ID-Token-Email".to_string(),
            permanent_redirect_cache_time: THIRTY_DAYS,
            https_redirect_cache_time: THIRTY_DAYS,
            static_url: "/static/".to_string(),
            static_root: PathBuf::from("static"),
            static_max_age: 60,
            append_slash: true,
            secure_ssl_redirect: false,
            secure_ssl_host: None,
            secure_redirect_exempt: Vec::new(),
            secure_proxy_ssl_header: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// [`Config::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: env::var("LISTEN").unwrap_or(defaults.listen_addr),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            configuration_name: env::var("APP_CONFIGURATION")
                .unwrap_or(defaults.configuration_name),
            remote_auth_header: env::var("OIDC_REMOTE_AUTH_HEADER")
                .unwrap_or(defaults.remote_auth_header),
            permanent_redirect_cache_time: env_parse("PERMANENT_REDIRECT_CACHE_TIME")
                .unwrap_or(defaults.permanent_redirect_cache_time),
            https_redirect_cache_time: env_parse("HTTPS_REDIRECT_CACHE_TIME")
                .unwrap_or(defaults.https_redirect_cache_time),
            static_url: env::var("STATIC_URL").unwrap_or(defaults.static_url),
            static_root: env::var("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_root),
            static_max_age: env_parse("STATIC_MAX_AGE").unwrap_or(defaults.static_max_age),
            append_slash: env_flag("APPEND_SLASH").unwrap_or(defaults.append_slash),
            secure_ssl_redirect: env_flag("SECURE_SSL_REDIRECT")
                .unwrap_or(defaults.secure_ssl_redirect),
            secure_ssl_host: env::var("SECURE_SSL_HOST").ok().filter(|h| !h.is_empty()),
            secure_redirect_exempt: env::var("SECURE_REDIRECT_EXEMPT")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.secure_redirect_exempt),
            secure_proxy_ssl_header: env::var("SECURE_PROXY_SSL_HEADER")
                .ok()
                .filter(|h| !h.is_empty()),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - `static_url` does not start and end with `/`, or is `/` itself
    /// - `remote_auth_header` or `secure_proxy_ssl_header` cannot be parsed
    /// - an exempt pattern is not a valid regex
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.static_url.len() < 2
            || !self.static_url.starts_with('/')
            || !self.static_url.ends_with('/')
        {
            anyhow::bail!(
                "STATIC_URL must start and end with '/' and not be '/', got '{}'",
                self.static_url
            );
        }

        self.remote_auth_header_name()
            .context("OIDC_REMOTE_AUTH_HEADER is not a usable header name")?;

        self.proxy_ssl_header()
            .context("SECURE_PROXY_SSL_HEADER must look like 'X-Forwarded-Proto: https'")?;

        self.exempt_patterns()
            .context("SECURE_REDIRECT_EXEMPT contains an invalid regex")?;

        Ok(())
    }

    /// Resolves [`Config::remote_auth_header`] to a header name.
    pub fn remote_auth_header_name(&self) -> Result<HeaderName, ConfigError> {
        parse_header_name(&self.remote_auth_header)
    }

    /// Parses [`Config::secure_proxy_ssl_header`] into its name and expected value.
    pub fn proxy_ssl_header(&self) -> Result<Option<(HeaderName, HeaderValue)>, ConfigError> {
        let Some(spec) = self.secure_proxy_ssl_header.as_deref() else {
            return Ok(None);
        };

        let (name, value) = spec
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedHeaderSpec(spec.to_string()))?;

        let name = parse_header_name(name.trim())?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ConfigError::InvalidHeaderValue(spec.to_string()))?;

        Ok(Some((name, value)))
    }

    /// Compiles [`Config::secure_redirect_exempt`].
    pub fn exempt_patterns(&self) -> Result<Vec<Regex>, regex::Error> {
        self.secure_redirect_exempt
            .iter()
            .map(|p| Regex::new(p))
            .collect()
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded ({}):", self.configuration_name);
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Remote auth header: {}", self.remote_auth_header);
        tracing::info!(
            "  Static files: {} -> {} (max-age {})",
            self.static_url,
            self.static_root.display(),
            self.static_max_age
        );
        tracing::info!(
            "  Append slash: {} (max-age {})",
            self.append_slash,
            self.permanent_redirect_cache_time
        );

        if self.secure_ssl_redirect {
            tracing::info!(
                "  HTTPS redirect: enabled (host: {}, max-age {}, {} exempt)",
                self.secure_ssl_host.as_deref().unwrap_or("<request host>"),
                self.https_redirect_cache_time,
                self.secure_redirect_exempt.len()
            );
        } else {
            tracing::info!("  HTTPS redirect: disabled");
        }
    }
}

/// Turns a header setting into a [`HeaderName`].
///
/// `HTTP_X_REMOTE_USER` and `X-Remote-User` both become `x-remote-user`.
pub fn parse_header_name(raw: &str) -> Result<HeaderName, ConfigError> {
    let name = match raw.strip_prefix("HTTP_") {
        Some(meta) => meta.replace('_', "-"),
        None => raw.to_string(),
    };

    HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(raw.to_string()))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env();
    config.validate()?;
    Ok(config)
}

//! Request header views used for logging and redirect targets.

use axum::http::{HeaderMap, Uri, header};
use std::collections::BTreeMap;

const HTTP_PREFIX: &str = "HTTP_";

/// Converts a header name to its CGI meta key.
///
/// `User-Agent` becomes `HTTP_USER_AGENT`; `Content-Type` and `Content-Length`
/// become `CONTENT_TYPE` and `CONTENT_LENGTH` with no prefix.
pub fn meta_key(name: &header::HeaderName) -> String {
    let key = name.as_str().to_ascii_uppercase().replace('-', "_");
    if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
        key
    } else {
        format!("{HTTP_PREFIX}{key}")
    }
}

/// Collects request headers into a flat map keyed by meta key without the
/// `HTTP_` prefix, e.g. `USER_AGENT`, `ACCEPT`, `CONTENT_TYPE`.
///
/// Only the exact leading `HTTP_` is removed, so `HTTP_HTTP_PING` maps to
/// `HTTP_PING`. Values that are not visible ASCII are decoded lossily.
/// Repeated headers are joined with `, `.
pub fn http_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();

    for (name, value) in headers {
        let key = meta_key(name);
        let key = if key.starts_with(HTTP_PREFIX) {
            key[HTTP_PREFIX.len()..].to_string()
        } else {
            key
        };
        let value = String::from_utf8_lossy(value.as_bytes());

        out.entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }

    out
}

/// Returns the host the client addressed, with port.
///
/// Uses the `Host` header, then the URI authority.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
}

/// Path plus query string, e.g. `/api/v1/?page=2`.
pub fn full_path(uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}?{}", uri.path(), query),
        None => uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_meta_key() {
        assert_eq!(meta_key(&header::USER_AGENT), "HTTP_USER_AGENT");
        assert_eq!(meta_key(&header::CONTENT_TYPE), "CONTENT_TYPE");
        assert_eq!(meta_key(&header::CONTENT_LENGTH), "CONTENT_LENGTH");
        assert_eq!(
            meta_key(&HeaderName::from_static("x-forwarded-proto")),
            "HTTP_X_FORWARDED_PROTO"
        );
    }

    #[test]
    fn test_http_headers_strips_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.4.0"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));

        let map = http_headers(&headers);

        assert_eq!(map.len(), 3);
        assert_eq!(map["USER_AGENT"], "curl/8.4.0");
        assert_eq!(map["CONTENT_TYPE"], "text/plain");
        assert_eq!(map["HOST"], "example.com");
    }

    #[test]
    fn test_http_headers_removes_prefix_once() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("http-ping"),
            HeaderValue::from_static("1"),
        );
        // Only the literal prefix goes, not a run of its characters.
        headers.insert(
            HeaderName::from_static("tp-trace"),
            HeaderValue::from_static("abc"),
        );

        let map = http_headers(&headers);

        assert_eq!(map["HTTP_PING"], "1");
        assert_eq!(map["TP_TRACE"], "abc");
    }

    #[test]
    fn test_http_headers_joins_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));

        let map = http_headers(&headers);

        assert_eq!(map["ACCEPT"], "text/html, application/json");
    }

    #[test]
    fn test_request_host() {
        let mut headers = HeaderMap::new();
        let uri: Uri = "http://fallback.example.com/path".parse().unwrap();

        assert_eq!(
            request_host(&headers, &uri).as_deref(),
            Some("fallback.example.com")
        );

        headers.insert(header::HOST, HeaderValue::from_static("example.com:8000"));
        assert_eq!(
            request_host(&headers, &uri).as_deref(),
            Some("example.com:8000")
        );

        let relative: Uri = "/path".parse().unwrap();
        assert!(request_host(&HeaderMap::new(), &relative).is_none());
    }

    #[test]
    fn test_full_path() {
        let uri: Uri = "/api/v1/recipe/?enabled=true".parse().unwrap();
        assert_eq!(full_path(&uri), "/api/v1/recipe/?enabled=true");

        let uri: Uri = "/api/v1/recipe/".parse().unwrap();
        assert_eq!(full_path(&uri), "/api/v1/recipe/");
    }
}

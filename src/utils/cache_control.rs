//! Merging of `Cache-Control` directives into response headers.

use axum::http::{HeaderMap, HeaderValue, header};

/// Directives to merge into a response's `Cache-Control` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheDirectives {
    pub public: bool,
    pub private: bool,
    pub max_age: Option<u64>,
    pub immutable: bool,
}

impl CacheDirectives {
    /// `public, max-age=<seconds>`
    pub fn public_max_age(seconds: u64) -> Self {
        Self {
            public: true,
            max_age: Some(seconds),
            ..Self::default()
        }
    }
}

/// Adds directives to the `Cache-Control` header, keeping what is already there.
///
/// # Merge Rules
///
/// - Directives already present and not mentioned are preserved, in order
/// - `public` removes `private`, and `private` removes `public`
/// - An existing `max-age` lower than the requested one is kept
/// - Directive names are compared case-insensitively and written lowercase
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-transform"));
///
/// patch_cache_control(&mut headers, CacheDirectives::public_max_age(60));
/// assert_eq!(headers[header::CACHE_CONTROL], "no-transform, public, max-age=60");
/// ```
pub fn patch_cache_control(headers: &mut HeaderMap, directives: CacheDirectives) {
    let mut entries: Vec<(String, Option<String>)> = headers
        .get_all(header::CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(parse_directive)
        .collect();

    let mut max_age = directives.max_age;
    if let Some(requested) = max_age {
        let existing = entries
            .iter()
            .find(|(name, _)| name == "max-age")
            .and_then(|(_, value)| value.as_deref())
            .and_then(|value| value.parse::<u64>().ok());
        if let Some(existing) = existing {
            max_age = Some(existing.min(requested));
        }
    }

    if directives.public {
        entries.retain(|(name, _)| name != "private");
    }
    if directives.private {
        entries.retain(|(name, _)| name != "public");
    }

    if directives.public {
        set_directive(&mut entries, "public", None);
    }
    if directives.private {
        set_directive(&mut entries, "private", None);
    }
    if let Some(seconds) = max_age {
        set_directive(&mut entries, "max-age", Some(seconds.to_string()));
    }
    if directives.immutable {
        set_directive(&mut entries, "immutable", None);
    }

    let rendered = entries
        .iter()
        .map(|(name, value)| match value {
            Some(value) => format!("{name}={value}"),
            None => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    headers.remove(header::CACHE_CONTROL);
    if let Ok(value) = HeaderValue::from_str(&rendered) {
        headers.insert(header::CACHE_CONTROL, value);
    }
}

fn parse_directive(raw: &str) -> Option<(String, Option<String>)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.split_once('=') {
        Some((name, value)) => Some((
            name.trim().to_ascii_lowercase(),
            Some(value.trim().to_string()),
        )),
        None => Some((raw.to_ascii_lowercase(), None)),
    }
}

fn set_directive(entries: &mut Vec<(String, Option<String>)>, name: &str, value: Option<String>) {
    match entries.iter_mut().find(|(existing, _)| existing == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name.to_string(), value)),
    }
}

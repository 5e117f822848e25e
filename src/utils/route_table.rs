//! Path patterns known to the router, for deciding whether a path resolves.
//!
//! axum does not expose route matching without dispatching the request, so the
//! routes that take part in trailing-slash correction are registered here as
//! well, using the same pattern syntax as `Router::route`.

/// One segment of a registered route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{name}`: any single non-empty segment.
    Param,
    /// `{*name}`: everything that remains, including nothing.
    CatchAll,
}

/// A set of axum-style route patterns.
///
/// # Examples
///
/// ```ignore
/// let routes = RouteTable::new(["/api/v1/recipe/", "/api/v1/recipe/{id}/"]);
///
/// assert!(routes.resolves("/api/v1/recipe/12/"));
/// assert!(!routes.resolves("/api/v1/recipe/12"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    patterns: Vec<Vec<Segment>>,
}

impl RouteTable {
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut table = Self::default();
        for pattern in patterns {
            table.insert(pattern.as_ref());
        }
        table
    }

    pub fn insert(&mut self, pattern: &str) {
        let segments = split(pattern)
            .map(|segment| {
                if segment.starts_with("{*") && segment.ends_with('}') {
                    Segment::CatchAll
                } else if segment.starts_with('{') && segment.ends_with('}') {
                    Segment::Param
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        self.patterns.push(segments);
    }

    /// Returns true if `path` matches any registered pattern.
    ///
    /// A trailing `/` is significant: `/a/` and `/a` are different paths.
    pub fn resolves(&self, path: &str) -> bool {
        let segments: Vec<&str> = split(path).collect();
        self.patterns
            .iter()
            .any(|pattern| matches(pattern, &segments))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Splits on `/`, keeping a trailing empty segment so `/a/` differs from `/a`.
fn split(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn matches(pattern: &[Segment], segments: &[&str]) -> bool {
    for (i, part) in pattern.iter().enumerate() {
        match part {
            Segment::CatchAll => return true,
            Segment::Param => match segments.get(i) {
                Some(s) if !s.is_empty() => {}
                _ => return false,
            },
            Segment::Literal(literal) => match segments.get(i) {
                Some(s) if s == literal => {}
                _ => return false,
            },
        }
    }
    pattern.len() == segments.len()
}

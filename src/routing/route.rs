//! Route expressions.
//!
//! # Grammar
//! ```text
//! route     := qualifier? segment ("/" segment)* ("?" query)?
//! qualifier := "/" | "./" | "../"+ | "!"
//! query     := key "=" value ("&" key "=" value)*
//! ```
//!
//! A run of `../` counts at most 255 levels; longer runs parse as
//! `Parent(255)`, which reaches the root of any realistic tree.
//!
//! # Design Decisions
//! - `Route` is an immutable value; every operation returns a new route
//! - Segments are never empty strings (`a//b` parses as `a/b`)
//! - Data is shared behind an `Arc` so cloning a route never copies the payload
//! - A bare segment (no qualifier) means "change content"

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Untyped key/value payload carried by a route.
pub type RouteData = BTreeMap<String, Value>;

/// Routing directive at the front of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Qualifier {
    /// Bare segment: change the content of the receiving region.
    #[default]
    None,
    /// `./` - route into a child region.
    Nested,
    /// `../` repeated `n` times - route to an ancestor region.
    Parent(u8),
    /// `/` - route from the root region.
    Root,
    /// `!` - open as a dialog.
    Dialog,
}

impl Qualifier {
    fn same_kind(self, other: Qualifier) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::None => Ok(()),
            Qualifier::Nested => f.write_str("./"),
            Qualifier::Parent(depth) => {
                for _ in 0..*depth {
                    f.write_str("../")?;
                }
                Ok(())
            }
            Qualifier::Root => f.write_str("/"),
            Qualifier::Dialog => f.write_str("!"),
        }
    }
}

/// A parsed navigation target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    qualifier: Qualifier,
    base: String,
    path: Vec<String>,
    data: Option<Arc<RouteData>>,
    internal: bool,
}

impl Route {
    /// The empty route: no qualifier, no segments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a route from a qualifier and its segments. Empty segments are dropped.
    pub fn new<I, S>(qualifier: Qualifier, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = segments
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty());
        let base = segments.next().unwrap_or_default();
        Self {
            qualifier,
            base,
            path: segments.collect(),
            data: None,
            internal: false,
        }
    }

    /// Parse a textual route such as `../../tabbed/doc0?id=42`.
    pub fn parse(text: &str) -> Self {
        let (expr, query) = match text.split_once('?') {
            Some((expr, query)) => (expr.trim(), Some(query)),
            None => (text.trim(), None),
        };

        let (qualifier, rest) = split_qualifier(expr);
        let mut route = Self::new(qualifier, rest.split('/'));
        if let Some(query) = query {
            let data = parse_query(query);
            if !data.is_empty() {
                route.data = Some(Arc::new(data));
            }
        }
        route
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Current segment, empty when the route is exhausted.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Segments after the base.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn data(&self) -> Option<&RouteData> {
        self.data.as_deref()
    }

    /// True once the route has passed the qualifier-forwarding stage.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Base and path as one iterator.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.base.as_str())
            .filter(|s| !s.is_empty())
            .chain(self.path.iter().map(String::as_str))
    }

    /// Segments joined with `/`, without qualifier or data.
    pub fn full_path(&self) -> String {
        self.segments().collect::<Vec<_>>().join("/")
    }

    pub fn is_empty(&self) -> bool {
        self.qualifier == Qualifier::None && self.base.is_empty() && self.path.is_empty()
    }

    pub fn is_nested(&self) -> bool {
        self.qualifier == Qualifier::Nested
    }

    pub fn is_parent(&self) -> bool {
        matches!(self.qualifier, Qualifier::Parent(_))
    }

    pub fn is_root(&self) -> bool {
        self.qualifier == Qualifier::Root
    }

    pub fn is_dialog(&self) -> bool {
        self.qualifier == Qualifier::Dialog
    }

    pub fn is_change_content(&self) -> bool {
        self.qualifier == Qualifier::None
    }

    /// True when both routes point at the same base segment.
    pub fn same_base(&self, other: &Route) -> bool {
        self.base == other.base
    }

    /// Remove one level of `qualifier` if the route carries it.
    ///
    /// Parent qualifiers lose one `../` per call; every other kind is removed
    /// outright. A route with a different qualifier is returned unchanged.
    pub fn trim_qualifier(&self, qualifier: Qualifier) -> Route {
        if !self.qualifier.same_kind(qualifier) {
            return self.clone();
        }
        let trimmed = match self.qualifier {
            Qualifier::Parent(depth) if depth > 1 => Qualifier::Parent(depth - 1),
            _ => Qualifier::None,
        };
        Route {
            qualifier: trimmed,
            ..self.clone()
        }
    }

    /// Advance to the next segment. The qualifier is consumed.
    pub fn next(&self) -> Route {
        let mut path = self.path.iter().cloned();
        let base = path.next().unwrap_or_default();
        Route {
            qualifier: Qualifier::None,
            base,
            path: path.collect(),
            data: self.data.clone(),
            internal: self.internal,
        }
    }

    /// Append the segments of `path` (qualifiers and query in `path` are ignored).
    pub fn append(&self, path: &str) -> Route {
        let extra = Route::parse(path);
        let mut route = self.clone();
        for segment in extra.segments() {
            if route.base.is_empty() {
                route.base = segment.to_string();
            } else {
                route.path.push(segment.to_string());
            }
        }
        route
    }

    /// Replace the base segment with the segments of `target`, keeping the
    /// qualifier, remaining path, data and internal flag of this route.
    pub fn rebase(&self, target: &Route) -> Route {
        let mut path: Vec<String> = target.path.clone();
        path.extend(self.path.iter().cloned());
        Route {
            qualifier: self.qualifier,
            base: target.base.clone(),
            path,
            data: self.data.clone(),
            internal: self.internal,
        }
    }

    /// Route holding only the current base segment, with data and flags kept.
    pub fn base_only(&self) -> Route {
        Route {
            qualifier: Qualifier::None,
            base: self.base.clone(),
            path: Vec::new(),
            data: self.data.clone(),
            internal: self.internal,
        }
    }

    /// Mark as internal so that no navigator re-applies qualifier forwarding.
    pub fn as_internal(&self) -> Route {
        Route {
            internal: true,
            ..self.clone()
        }
    }

    pub fn with_data(&self, data: RouteData) -> Route {
        Route {
            data: (!data.is_empty()).then(|| Arc::new(data)),
            ..self.clone()
        }
    }
}

impl From<&str> for Route {
    fn from(text: &str) -> Self {
        Route::parse(text)
    }
}

impl From<String> for Route {
    fn from(text: String) -> Self {
        Route::parse(&text)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.qualifier, self.full_path())?;
        if let Some(data) = self.data() {
            let mut separator = '?';
            for (key, value) in data {
                match value {
                    Value::String(s) => write!(f, "{separator}{key}={s}")?,
                    other => write!(f, "{separator}{key}={other}")?,
                }
                separator = '&';
            }
        }
        Ok(())
    }
}

fn split_qualifier(expr: &str) -> (Qualifier, &str) {
    if let Some(rest) = expr.strip_prefix('!') {
        return (Qualifier::Dialog, rest);
    }
    if expr.starts_with("../") || expr == ".." {
        let mut depth: u8 = 0;
        let mut rest = expr;
        while let Some(tail) = rest.strip_prefix("../") {
            depth = depth.saturating_add(1);
            rest = tail;
        }
        if rest == ".." {
            depth = depth.saturating_add(1);
            rest = "";
        }
        return (Qualifier::Parent(depth), rest);
    }
    if let Some(rest) = expr.strip_prefix("./") {
        return (Qualifier::Nested, rest);
    }
    if let Some(rest) = expr.strip_prefix('/') {
        return (Qualifier::Root, rest);
    }
    (Qualifier::None, expr)
}

fn parse_query(query: &str) -> RouteData {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), Value::String(value.to_string())),
            None => (pair.to_string(), Value::String(String::new())),
        })
        .collect()
}

//! Route keys and path normalization.
//!
//! # Design Decisions
//! - A key is the (method, path template) pair; the same path may carry many methods
//! - Paths always start with `/` so they can be handed to the router unchanged
//! - Normalization for the known-path set trims slashes and lowercases

use std::fmt;

use axum::http::Method;

/// Identifies one handler inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: Method,
    path: String,
}

impl RouteKey {
    /// Create a key. A missing leading slash is added.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self { method, path }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template as declared (e.g. `/notes/{id}`).
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Normalize a path for known-path lookups.
///
/// Surrounding slashes are trimmed and the result is lowercased, so `/Foo/`,
/// `foo` and `FOO` all collapse to `foo`. The root path becomes the empty string.
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_lowercase()
}

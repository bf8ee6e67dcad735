//! Verb-agnostic set of registered paths, used for 405 detection.

use std::collections::HashSet;

use crate::routing::key::normalize_path;

/// Normalized paths owned by the application.
///
/// Coarser than the route table: it records that a path exists, not which
/// methods it accepts.
#[derive(Debug, Clone, Default)]
pub struct KnownPaths {
    paths: HashSet<String>,
}

impl KnownPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path. Returns false if an equivalent path was already present.
    pub fn insert(&mut self, path: &str) -> bool {
        self.paths.insert(normalize_path(path))
    }

    /// Returns true if the path, once normalized, is known.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_membership() {
        let mut paths = KnownPaths::new();
        assert!(paths.insert("/Foo/"));
        assert!(paths.contains("foo"));
        assert!(paths.contains("FOO"));
        assert!(paths.contains("/foo"));
        assert!(!paths.contains("/foo/bar"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut paths = KnownPaths::new();
        assert!(paths.insert("/notes"));
        assert!(!paths.insert("/NOTES/"));
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_root_is_valid_key() {
        let mut paths = KnownPaths::new();
        assert!(!paths.contains("/"));
        paths.insert("/");
        assert!(paths.contains(""));
        assert!(paths.contains("/"));
    }
}

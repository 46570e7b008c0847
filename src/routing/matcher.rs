//! Path prefix matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive and byte-for-byte
//! - A prefix only matches at a segment boundary: `/api` matches `/api` and
//!   `/api/...`, never `/apiv2`
//! - No wildcards or regex

/// Matches a literal path prefix at a segment boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The literal prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` is the prefix itself or continues it with `/`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

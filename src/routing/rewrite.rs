//! Outbound path derivation.

use std::borrow::Cow;

/// Strip `pattern` from the front of `path`; an empty remainder becomes `/`.
///
/// A path that does not start with `pattern` is returned unchanged. The query
/// string is not part of `path` and is never touched here.
pub fn rewrite_path<'a>(pattern: &str, path: &'a str) -> Cow<'a, str> {
    match path.strip_prefix(pattern) {
        Some("") => Cow::Borrowed("/"),
        Some(rest) => Cow::Borrowed(rest),
        None => Cow::Borrowed(path),
    }
}

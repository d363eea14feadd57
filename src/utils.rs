//! Utility functions for cross-platform path handling

use std::borrow::Cow;

/// Normalize a repository-relative path to forward slashes.
///
/// Git always reports forward slashes, but paths supplied by hand (or by tools on
/// Windows) may not. Borrowed when nothing needs replacing.
pub fn normalize_separators(path: &str) -> Cow<'_, str> {
  if path.contains('\\') {
    Cow::Owned(path.replace('\\', "/"))
  } else {
    Cow::Borrowed(path)
  }
}

/// Split NUL-delimited git output (`-z`) into normalized, deduplicated paths.
///
/// Order of first appearance is preserved.
pub fn split_nul_paths(raw: &str) -> Vec<String> {
  let mut seen = std::collections::HashSet::new();
  raw
    .split('\0')
    .filter(|entry| !entry.is_empty())
    .map(|entry| normalize_separators(entry).into_owned())
    .filter(|entry| seen.insert(entry.clone()))
    .collect()
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key path type for addressing locations inside a configuration document.
//!
//! This module provides the `KeyPath` type, an ordered list of segments rendered
//! dot-joined (`db.host`). Key paths are synthesized from environment variable
//! names and used to look values up in a resolved configuration.

use heck::ToLowerCamelCase;
use std::fmt;

/// A type-safe, dot-joined path into a configuration document.
///
/// # Examples
///
/// ```
/// use layercfg::domain::KeyPath;
///
/// let path = KeyPath::from("database.host");
/// assert_eq!(path.segments(), &["database", "host"]);
/// assert_eq!(path.to_string(), "database.host");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Creates a key path from its segments.
    pub fn new(segments: Vec<String>) -> Self {
        KeyPath(segments)
    }

    /// Builds a key path from the tail of an environment variable name.
    ///
    /// The tail (the variable name with the application prefix and separator
    /// removed) is split on `separator` and every segment is converted from
    /// `UPPER_SNAKE_CASE` to `lowerCamelCase`. Returns `None` when any segment
    /// would be empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::KeyPath;
    ///
    /// let path = KeyPath::from_env_tail("FOO_BAR__BAZ", "__").unwrap();
    /// assert_eq!(path.to_string(), "fooBar.baz");
    ///
    /// assert!(KeyPath::from_env_tail("DB____HOST", "__").is_none());
    /// ```
    pub fn from_env_tail(tail: &str, separator: &str) -> Option<Self> {
        let segments = tail
            .split(separator)
            .map(|segment| segment.to_lower_camel_case())
            .collect::<Vec<_>>();

        if segments.iter().any(String::is_empty) {
            return None;
        }

        Some(KeyPath(segments))
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        KeyPath(segments)
    }

    /// Returns the path made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> Self {
        KeyPath(self.0[..len.min(self.0.len())].to_vec())
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return KeyPath::default();
        }
        KeyPath(s.split('.').map(str::to_string).collect())
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        KeyPath::from(s.as_str())
    }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path_from_str() {
        let path = KeyPath::from("db.host");
        assert_eq!(path.segments(), &["db".to_string(), "host".to_string()]);
    }

    #[test]
    fn test_key_path_empty_is_root() {
        let path = KeyPath::from("");
        assert!(path.is_root());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_key_path_display() {
        let path = KeyPath::new(vec!["fooBar".to_string(), "baz".to_string()]);
        assert_eq!(format!("{}", path), "fooBar.baz");
    }

    #[test]
    fn test_key_path_child_and_prefix() {
        let path = KeyPath::from("a").child("b").child("c");
        assert_eq!(path.to_string(), "a.b.c");
        assert_eq!(path.prefix(2).to_string(), "a.b");
        assert_eq!(path.prefix(10), path);
    }

    #[test]
    fn test_from_env_tail_single_segment() {
        let path = KeyPath::from_env_tail("HOST", "__").unwrap();
        assert_eq!(path.to_string(), "host");
    }

    #[test]
    fn test_from_env_tail_camel_cases_words() {
        let path = KeyPath::from_env_tail("FOO_BAR__BAZ", "__").unwrap();
        assert_eq!(path.to_string(), "fooBar.baz");

        let path = KeyPath::from_env_tail("MAX_POOL_SIZE", "__").unwrap();
        assert_eq!(path.to_string(), "maxPoolSize");
    }

    #[test]
    fn test_from_env_tail_custom_separator() {
        let path = KeyPath::from_env_tail("DB-HOST_NAME", "-").unwrap();
        assert_eq!(path.to_string(), "db.hostName");
    }

    #[test]
    fn test_from_env_tail_rejects_empty_segments() {
        assert!(KeyPath::from_env_tail("", "__").is_none());
        assert!(KeyPath::from_env_tail("DB__", "__").is_none());
        assert!(KeyPath::from_env_tail("DB____HOST", "__").is_none());
    }

    #[test]
    fn test_string_from_key_path() {
        let s: String = KeyPath::from("a.b").into();
        assert_eq!(s, "a.b");
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! The validated, immutable result of a configuration resolution.

use crate::domain::document::lookup;
use crate::domain::{ConfigError, KeyPath, Result};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// A frozen configuration snapshot.
///
/// A `ResolvedConfig` is only ever built from a document that passed schema
/// validation. It exposes read-only accessors; clones share the same snapshot.
/// [`ResolvedConfig::into_value`] hands out an owned copy, so changes made to
/// that copy are never visible through any `ResolvedConfig`.
///
/// # Examples
///
/// ```
/// use layercfg::domain::ResolvedConfig;
/// use serde_json::json;
///
/// let config = ResolvedConfig::from_value(json!({"db": {"host": "localhost", "port": 5432}}));
/// assert_eq!(config.get_str("db.host"), Some("localhost"));
/// assert_eq!(config.get_i64("db.port"), Some(5432));
/// assert_eq!(config.get_bool("db.ssl"), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig(Arc<Value>);

impl ResolvedConfig {
    /// Wraps a value without validating it.
    ///
    /// Snapshots produced by the resolver always hold an object.
    pub fn from_value(value: Value) -> Self {
        ResolvedConfig(Arc::new(value))
    }

    /// Returns the whole configuration tree.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the value at a dot-joined key path.
    pub fn get(&self, path: impl Into<KeyPath>) -> Option<&Value> {
        lookup(&self.0, &path.into())
    }

    /// Returns the string at `path`, if present and a string.
    pub fn get_str(&self, path: impl Into<KeyPath>) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Returns the integer at `path`, if present and an integer.
    pub fn get_i64(&self, path: impl Into<KeyPath>) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// Returns the number at `path` as a float, if present and numeric.
    pub fn get_f64(&self, path: impl Into<KeyPath>) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    /// Returns the boolean at `path`, if present and a boolean.
    pub fn get_bool(&self, path: impl Into<KeyPath>) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Returns true if a value (including `null`) exists at `path`.
    pub fn contains(&self, path: impl Into<KeyPath>) -> bool {
        self.get(path).is_some()
    }

    /// Deserializes the snapshot into a typed configuration struct.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::ResolvedConfig;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize)]
    /// struct Db {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// let config = ResolvedConfig::from_value(json!({"host": "localhost", "port": 5432}));
    /// let db: Db = config.deserialize().unwrap();
    /// assert_eq!(db.host, "localhost");
    /// assert_eq!(db.port, 5432);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(self.as_value()).map_err(ConfigError::conversion::<T>)
    }

    /// Returns an owned copy of the configuration tree.
    pub fn to_value(&self) -> Value {
        Value::clone(&self.0)
    }

    /// Consumes the snapshot, returning an owned tree.
    ///
    /// The tree is moved out when this is the last handle to the snapshot and
    /// copied otherwise.
    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| Value::clone(&shared))
    }
}

impl PartialEq<Value> for ResolvedConfig {
    fn eq(&self, other: &Value) -> bool {
        self.as_value() == other
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl std::fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> ResolvedConfig {
        ResolvedConfig::from_value(json!({
            "name": "app_name",
            "db": {"host": "localhost", "port": 5432, "ssl": true, "ratio": 0.5},
            "foo": [1, 2, 3],
            "nothing": null
        }))
    }

    #[test]
    fn test_typed_accessors() {
        let config = sample();
        assert_eq!(config.get_str("name"), Some("app_name"));
        assert_eq!(config.get_i64("db.port"), Some(5432));
        assert_eq!(config.get_bool("db.ssl"), Some(true));
        assert_eq!(config.get_f64("db.ratio"), Some(0.5));
        assert_eq!(config.get_i64("foo.2"), Some(3));
    }

    #[test]
    fn test_accessors_reject_wrong_types() {
        let config = sample();
        assert_eq!(config.get_str("db.port"), None);
        assert_eq!(config.get_bool("db.host"), None);
        assert_eq!(config.get_i64("missing.key"), None);
    }

    #[test]
    fn test_contains_null() {
        let config = sample();
        assert!(config.contains("nothing"));
        assert!(!config.contains("absent"));
    }

    #[test]
    fn test_into_value_does_not_affect_clones() {
        let config = sample();
        let kept = config.clone();

        let mut owned = config.into_value();
        owned["db"]["host"] = json!("elsewhere");

        assert_eq!(kept.get_str("db.host"), Some("localhost"));
    }

    #[test]
    fn test_into_value_last_handle() {
        let config = ResolvedConfig::from_value(json!({"a": 1}));
        assert_eq!(config.into_value(), json!({"a": 1}));
    }

    #[test]
    fn test_deserialize_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Db {
            host: String,
            port: i32,
            ssl: Option<bool>,
        }

        #[derive(Debug, Deserialize)]
        struct App {
            db: Db,
            foo: Vec<i32>,
        }

        let app: App = sample().deserialize().unwrap();
        assert_eq!(
            app.db,
            Db {
                host: "localhost".to_string(),
                port: 5432,
                ssl: Some(true)
            }
        );
        assert_eq!(app.foo, vec![1, 2, 3]);
    }

    #[test]
    fn test_deserialize_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            name: u32,
        }

        let result = sample().deserialize::<Wrong>();
        assert!(matches!(result, Err(ConfigError::TypeConversionError { .. })));
    }

    #[test]
    fn test_serialize_and_display() {
        let config = ResolvedConfig::from_value(json!({"a": 1}));
        assert_eq!(serde_json::to_string(&config).unwrap(), "{\"a\":1}");
        assert_eq!(config.to_string(), "{\"a\":1}");
        assert_eq!(config, json!({"a": 1}));
    }
}

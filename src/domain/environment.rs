// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable snapshots of environment variables.
//!
//! Loaders never read `std::env` piecemeal. They work from an [`Environment`]
//! captured once per load, or injected by the caller so that tests and
//! concurrent resolutions never depend on process-global state. The one
//! exception is `APPLICATION_CONFIG`, which names a path and is read with
//! `std::env::var_os` when no snapshot is injected.

use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable, cheaply clonable snapshot of environment variables.
///
/// Variables iterate in name order, which keeps everything derived from a
/// snapshot deterministic.
///
/// # Examples
///
/// ```
/// use layercfg::domain::Environment;
///
/// let env = Environment::from_iter([("FOO__DB__HOST", "localhost")]);
/// assert_eq!(env.get("FOO__DB__HOST"), Some("localhost"));
/// assert_eq!(env.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment(Arc<BTreeMap<String, String>>);

impl Environment {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are left out.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    tracing::debug!(
                        "Skipping environment variable with non UTF-8 content: {:?}",
                        key.map_or_else(|os| os.to_string_lossy().into_owned(), |k| k)
                    );
                    None
                }
            })
            .collect();
        Environment(Arc::new(vars))
    }

    /// Returns the value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables in the snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Environment(Arc::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }
}

/// Serializes unit tests that read or write the process environment.
#[cfg(test)]
pub(crate) fn lock_process_env() -> std::sync::MutexGuard<'static, ()> {
    static PROCESS_ENV: std::sync::Mutex<()> = std::sync::Mutex::new(());
    PROCESS_ENV
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

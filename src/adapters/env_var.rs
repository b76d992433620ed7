// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration loader.
//!
//! This module provides the loader that maps application-prefixed environment
//! variables onto a nested configuration document.

use crate::domain::document::insert_at_path;
use crate::domain::{ConfigError, Document, Environment, IntegerCoercion, KeyPath, Result};
use crate::ports::ConfigLoader;

/// Separator between the prefix and the key segments of a variable name.
pub const DEFAULT_SEPARATOR: &str = "__";

/// Maximum length of environment variable names considered for mapping.
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length of environment variable values considered for mapping.
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Maps environment variables onto a configuration document.
///
/// With the application name `foo-bar` and the default separator, the variable
/// `FOO_BAR__DB__MAX_POOL_SIZE=10` becomes `{"db": {"maxPoolSize": 10}}`:
///
/// 1. the prefix is the name upper-cased with `-` replaced by `_`
/// 2. only variables starting with `<PREFIX><separator>` are considered
/// 3. the remainder is split on the separator and each segment is converted
///    from `UPPER_SNAKE_CASE` to `lowerCamelCase`
/// 4. values are coerced to booleans and integers where possible
///
/// A mapper without an application name (or with an empty one) produces an
/// empty document.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::EnvKeyMapper;
/// use layercfg::domain::Environment;
/// use layercfg::ports::ConfigLoader;
/// use serde_json::json;
///
/// let env = Environment::from_iter([
///     ("FOO__DB__HOST", "localhost"),
///     ("FOO__DB__PORT", "5432"),
///     ("OTHER__DB__HOST", "ignored"),
/// ]);
///
/// let mapper = EnvKeyMapper::for_app("foo").with_environment(env);
/// let doc = mapper.load().unwrap();
///
/// assert_eq!(
///     serde_json::Value::Object(doc),
///     json!({"db": {"host": "localhost", "port": 5432}})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EnvKeyMapper {
    app_name: Option<String>,
    separator: String,
    coercion: IntegerCoercion,
    environment: Option<Environment>,
}

impl EnvKeyMapper {
    /// Creates a mapper without an application name. It always loads an empty document.
    pub fn new() -> Self {
        Self {
            app_name: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            coercion: IntegerCoercion::default(),
            environment: None,
        }
    }

    /// Creates a mapper for the given application name.
    pub fn for_app(app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
            ..Self::new()
        }
    }

    /// Sets the separator between key segments (default `__`).
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets how integer tokens are recognized.
    pub fn integer_coercion(mut self, coercion: IntegerCoercion) -> Self {
        self.coercion = coercion;
        self
    }

    /// Maps a fixed snapshot instead of the process environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Returns the variable name prefix, including the trailing separator.
    ///
    /// `Ok(None)` means no application was identified, so nothing is mapped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layercfg::adapters::EnvKeyMapper;
    ///
    /// let mapper = EnvKeyMapper::for_app("foo-bar");
    /// assert_eq!(mapper.prefix().unwrap(), Some("FOO_BAR__".to_string()));
    ///
    /// assert_eq!(EnvKeyMapper::for_app("").prefix().unwrap(), None);
    /// assert!(EnvKeyMapper::for_app(" ").prefix().is_err());
    /// ```
    pub fn prefix(&self) -> Result<Option<String>> {
        if self.separator.is_empty() {
            return Err(ConfigError::InvalidSeparator);
        }

        let name = match self.app_name.as_deref() {
            None | Some("") => return Ok(None),
            Some(name) => name,
        };

        let valid = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigError::InvalidApplicationName {
                name: name.to_string(),
            });
        }

        Ok(Some(format!(
            "{}{}",
            name.to_ascii_uppercase().replace('-', "_"),
            self.separator
        )))
    }

    fn map(&self, prefix: &str, environment: &Environment) -> Result<Document> {
        let mut doc = Document::new();

        for (name, value) in environment.iter() {
            let Some(tail) = name.strip_prefix(prefix) else {
                continue;
            };

            // Validate input sizes to prevent DoS
            if name.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                return Err(ConfigError::SourceError {
                    source_name: "env".to_string(),
                    message: format!(
                        "Environment variable too large: key_len={}, value_len={} (max key={}, max value={})",
                        name.len(),
                        value.len(),
                        MAX_ENV_KEY_LEN,
                        MAX_ENV_VALUE_LEN
                    ),
                    source: None,
                });
            }

            let path = KeyPath::from_env_tail(tail, &self.separator).ok_or_else(|| {
                ConfigError::InvalidEnvironmentKey {
                    variable: name.to_string(),
                }
            })?;

            insert_at_path(&mut doc, &path, self.coercion.coerce(value)).map_err(|conflict| {
                ConfigError::ConflictingKeyPath {
                    path: conflict.occupied.to_string(),
                    variable: name.to_string(),
                }
            })?;

            tracing::trace!("Mapped environment variable {} to {}", name, path);
        }

        Ok(doc)
    }
}

impl Default for EnvKeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for EnvKeyMapper {
    fn name(&self) -> &str {
        "env"
    }

    fn load(&self) -> Result<Document> {
        let Some(prefix) = self.prefix()? else {
            tracing::debug!("No application name configured, skipping environment variables");
            return Ok(Document::new());
        };

        let environment = match &self.environment {
            Some(environment) => environment.clone(),
            None => Environment::capture(),
        };

        let doc = self.map(&prefix, &environment)?;

        tracing::debug!(
            "Mapped {} top-level keys from environment variables (prefix={}, coercion={:?})",
            doc.len(),
            prefix,
            self.coercion
        );

        Ok(doc)
    }
}

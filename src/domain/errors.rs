// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the error types that can occur while loading, merging and
//! validating configuration. All errors use `thiserror` for proper error handling
//! and conversion.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single schema violation found while validating a merged document.
///
/// The `path` is the dot-joined key path of the offending location (array
/// indices appear as numeric segments, the document root is the empty string).
///
/// # Examples
///
/// ```
/// use layercfg::domain::Violation;
///
/// let violation = Violation::new("db.ssl", "expected boolean");
/// assert_eq!(violation.to_string(), "db.ssl: expected boolean");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Location of the offending value
    pub path: String,
    /// Human readable description of the expectation that was not met
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The main error type for configuration operations.
///
/// Every variant is fatal to the resolution call that produced it. It is marked
/// as `#[non_exhaustive]` to allow for future additions without breaking
/// backwards compatibility.
///
/// # Examples
///
/// ```
/// use layercfg::domain::errors::ConfigError;
///
/// fn check_name(name: &str) -> Result<(), ConfigError> {
///     Err(ConfigError::InvalidApplicationName {
///         name: name.to_string(),
///     })
/// }
///
/// assert!(check_name("  ").is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An application name was supplied but cannot form an environment prefix.
    #[error("Invalid application name: '{name}'")]
    InvalidApplicationName {
        /// The rejected name
        name: String,
    },

    /// The environment key separator was empty.
    #[error("Environment key separator must not be empty")]
    InvalidSeparator,

    /// An environment variable produced a key path with an empty segment.
    #[error("Environment variable '{variable}' does not map to a valid key path")]
    InvalidEnvironmentKey {
        /// The offending variable name
        variable: String,
    },

    /// Two environment variables map to overlapping key paths.
    #[error("Environment variable '{variable}' conflicts with key path '{path}'")]
    ConflictingKeyPath {
        /// The key path already occupied
        path: String,
        /// The variable that could not be assigned
        variable: String,
    },

    /// The configuration directory does not exist.
    #[error("Configuration directory not found: {}", .path.display())]
    ConfigDirectoryNotFound {
        /// The directory that was looked up
        path: PathBuf,
    },

    /// A configuration file exists but does not hold a JSON object.
    #[error("Invalid configuration file {}: {source}", .path.display())]
    InvalidConfigFile {
        /// The file that failed to parse
        path: PathBuf,
        /// The underlying parsing error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The merged document does not satisfy the schema.
    #[error(
        "Configuration validation failed with {} violation(s): {}",
        .violations.len(),
        join_violations(.violations)
    )]
    ConfigValidationError {
        /// Every violation reported by the validator
        violations: Vec<Violation>,
    },

    /// A schema definition could not be compiled.
    #[error("Invalid schema: {message}")]
    InvalidSchema {
        /// The error message
        message: String,
    },

    /// The validated document could not be converted to the requested type.
    #[error("Failed to convert configuration to type {target_type}: {source}")]
    TypeConversionError {
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error occurred in a configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConfigError {
    /// Creates a `TypeConversionError` for the target type `T`.
    pub fn conversion<T>(err: serde_json::Error) -> Self {
        ConfigError::TypeConversionError {
            target_type: std::any::type_name::<T>().to_string(),
            source: Box::new(err),
        }
    }

    /// Returns the schema violations if this is a validation error.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            ConfigError::ConfigValidationError { violations } => Some(violations),
            _ => None,
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_application_name_error() {
        let error = ConfigError::InvalidApplicationName {
            name: " ".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid application name: ' '");
    }

    #[test]
    fn test_conflicting_key_path_error() {
        let error = ConfigError::ConflictingKeyPath {
            path: "db".to_string(),
            variable: "FOO__DB__HOST".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Environment variable 'FOO__DB__HOST' conflicts with key path 'db'"
        );
    }

    #[test]
    fn test_directory_not_found_error() {
        let error = ConfigError::ConfigDirectoryNotFound {
            path: PathBuf::from("/nope/config"),
        };
        assert_eq!(
            error.to_string(),
            "Configuration directory not found: /nope/config"
        );
    }

    #[test]
    fn test_invalid_config_file_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ConfigError::InvalidConfigFile {
            path: PathBuf::from("config/application.json"),
            source: Box::new(parse_err),
        };
        assert!(error
            .to_string()
            .starts_with("Invalid configuration file config/application.json: "));
    }

    #[test]
    fn test_validation_error_lists_every_violation() {
        let error = ConfigError::ConfigValidationError {
            violations: vec![
                Violation::new("db.ssl", "expected boolean"),
                Violation::new("db.host", "missing required property"),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Configuration validation failed with 2 violation(s): \
             db.ssl: expected boolean; db.host: missing required property"
        );
        assert_eq!(error.violations().map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_root_violation_display() {
        let violation = Violation::new("", "expected object");
        assert_eq!(violation.to_string(), "<root>: expected object");
    }

    #[test]
    fn test_source_error() {
        let error = ConfigError::SourceError {
            source_name: "json-file".to_string(),
            message: "Failed to read configuration file".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Configuration source 'json-file' error: Failed to read configuration file"
        );
        assert!(error.violations().is_none());
    }

    #[test]
    fn test_conversion_error_names_target_type() {
        let err = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let error = ConfigError::conversion::<u8>(err);
        assert!(matches!(error, ConfigError::TypeConversionError { .. }));
        assert!(error.to_string().contains("u8"));
    }
}

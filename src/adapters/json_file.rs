// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file configuration loader.
//!
//! This module provides the JSON parser and the aggregator that reads the
//! layered configuration files of an application directory.

use crate::domain::document::merge_documents;
use crate::domain::{ConfigError, Document, Environment, Result};
use crate::ports::{ConfigLoader, ConfigParser, ParseFailure};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory searched when no target directory is configured, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable naming an override file when none is configured.
pub const CONFIG_PATH_ENV: &str = "APPLICATION_CONFIG";

/// Baseline defaults, lowest precedence.
pub const DEFAULT_APPLICATION_FILE: &str = "default.application.json";

/// Deployment-specific overrides of the defaults.
pub const APPLICATION_FILE: &str = "application.json";

/// Maximum allowed file size for JSON configuration files (10MB)
/// This prevents denial of service attacks via extremely large files
const MAX_JSON_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// JSON parser implementation.
///
/// The top level of the document must be an object.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::JsonParser;
/// use layercfg::ports::ConfigParser;
/// use serde_json::json;
///
/// let parser = JsonParser::new();
/// let doc = parser.parse(r#"{"database": {"host": "localhost", "port": 5432}}"#).unwrap();
/// assert_eq!(doc["database"]["port"], json!(5432));
///
/// assert!(parser.parse("[1, 2, 3]").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Creates a new JSON parser.
    pub fn new() -> Self {
        JsonParser
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl ConfigParser for JsonParser {
    fn parse(&self, content: &str) -> std::result::Result<Document, ParseFailure> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => Ok(map),
            other => Err(format!(
                "top level must be an object, found {}",
                kind_of(&other)
            )
            .into()),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// What to do when the target directory does not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDirectoryPolicy {
    /// Fail with `ConfigError::ConfigDirectoryNotFound`.
    Error,
    /// Treat the directory as empty; an absolute override file is still read.
    Ignore,
}

/// Reads and deep-merges the layered configuration files of an application.
///
/// Candidates, in increasing precedence:
///
/// 1. `default.application.json` in the target directory
/// 2. `application.json` in the target directory
/// 3. the override file: the configured path, else the value of
///    `APPLICATION_CONFIG`; relative paths are resolved against the target directory
///
/// Missing candidates are skipped. A candidate that exists but does not parse
/// as a JSON object fails the load with `ConfigError::InvalidConfigFile`.
///
/// The target directory defaults to `config` under the working directory. When
/// no [`MissingDirectoryPolicy`] is set, a missing directory is an error if it
/// was configured explicitly and contributes nothing if it is the default.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::adapters::FileAggregator;
/// use layercfg::ports::ConfigLoader;
///
/// let doc = FileAggregator::in_dir("/etc/myapp")
///     .config_path("production.json")
///     .load()?;
/// # Ok::<(), layercfg::domain::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct FileAggregator {
    target_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    missing_dir: Option<MissingDirectoryPolicy>,
    environment: Option<Environment>,
    parser: Arc<dyn ConfigParser>,
}

impl FileAggregator {
    /// Creates an aggregator for `./config` in the working directory.
    pub fn new() -> Self {
        Self {
            target_dir: None,
            config_path: None,
            missing_dir: None,
            environment: None,
            parser: Arc::new(JsonParser::new()),
        }
    }

    /// Creates an aggregator for an explicit target directory.
    pub fn in_dir(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: Some(target_dir.into()),
            ..Self::new()
        }
    }

    /// Sets the override file, absolute or relative to the target directory.
    ///
    /// Takes precedence over `APPLICATION_CONFIG`.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Sets the policy for a missing target directory.
    pub fn missing_directory(mut self, policy: MissingDirectoryPolicy) -> Self {
        self.missing_dir = Some(policy);
        self
    }

    /// Looks up `APPLICATION_CONFIG` in a fixed snapshot instead of the process environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Replaces the JSON parser.
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Returns the directory the candidates are resolved against.
    pub fn target_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.target_dir {
            return Ok(dir.clone());
        }

        let cwd = std::env::current_dir().map_err(|e| ConfigError::SourceError {
            source_name: "json-file".to_string(),
            message: "Failed to determine the working directory".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Returns the candidate files a load would consider, lowest precedence first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layercfg::adapters::FileAggregator;
    /// use layercfg::domain::Environment;
    /// use std::path::PathBuf;
    ///
    /// let env = Environment::from_iter([("APPLICATION_CONFIG", "/run/secrets/app.json")]);
    /// let aggregator = FileAggregator::in_dir("/srv/app/config").with_environment(env);
    ///
    /// assert_eq!(
    ///     aggregator.candidates().unwrap(),
    ///     vec![
    ///         PathBuf::from("/srv/app/config/default.application.json"),
    ///         PathBuf::from("/srv/app/config/application.json"),
    ///         PathBuf::from("/run/secrets/app.json"),
    ///     ]
    /// );
    /// ```
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        let dir = self.target_dir()?;
        Ok(self.candidates_in(&dir))
    }

    fn candidates_in(&self, dir: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![
            dir.join(DEFAULT_APPLICATION_FILE),
            dir.join(APPLICATION_FILE),
        ];

        if let Some(path) = self.override_path() {
            if path.is_absolute() {
                candidates.push(path);
            } else {
                candidates.push(dir.join(path));
            }
        }

        candidates
    }

    fn override_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }

        // The process variable is read as an OsString so non-UTF-8 paths work
        let value = match &self.environment {
            Some(environment) => environment.get(CONFIG_PATH_ENV).map(PathBuf::from),
            None => std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
        };

        value.filter(|path| !path.as_os_str().is_empty())
    }

    /// Reads a candidate. `Ok(None)` means the file does not exist.
    fn read_candidate(&self, path: &Path) -> Result<Option<String>> {
        let read_error = |message: String, e: std::io::Error| ConfigError::SourceError {
            source_name: "json-file".to_string(),
            message,
            source: Some(Box::new(e)),
        };

        // Check file size before reading to prevent DoS via large files
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(read_error(
                    format!("Failed to read file metadata: {}", path.display()),
                    e,
                ))
            }
        };

        if metadata.is_dir() {
            return Err(ConfigError::SourceError {
                source_name: "json-file".to_string(),
                message: format!("Configuration path is a directory: {}", path.display()),
                source: None,
            });
        }

        if metadata.len() > MAX_JSON_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: "json-file".to_string(),
                message: format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_JSON_FILE_SIZE
                ),
                source: None,
            });
        }

        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(ConfigError::InvalidConfigFile {
                path: path.to_path_buf(),
                source: Box::new(e),
            }),
            Err(e) => Err(read_error(
                format!("Failed to read configuration file: {}", path.display()),
                e,
            )),
        }
    }
}

impl Default for FileAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAggregator")
            .field("target_dir", &self.target_dir)
            .field("config_path", &self.config_path)
            .field("missing_dir", &self.missing_dir)
            .field("environment", &self.environment)
            .field("parser", &self.parser.supported_extensions())
            .finish()
    }
}

impl ConfigLoader for FileAggregator {
    fn name(&self) -> &str {
        "json-file"
    }

    fn load(&self) -> Result<Document> {
        let dir = self.target_dir()?;

        if !dir.is_dir() {
            let policy = self.missing_dir.unwrap_or(if self.target_dir.is_some() {
                MissingDirectoryPolicy::Error
            } else {
                MissingDirectoryPolicy::Ignore
            });

            match policy {
                MissingDirectoryPolicy::Error => {
                    return Err(ConfigError::ConfigDirectoryNotFound { path: dir });
                }
                MissingDirectoryPolicy::Ignore => {
                    tracing::debug!("Configuration directory {} not found, ignoring", dir.display());
                }
            }
        }

        let mut doc = Document::new();
        for path in self.candidates_in(&dir) {
            let Some(content) = self.read_candidate(&path)? else {
                tracing::debug!("Skipping missing configuration file {}", path.display());
                continue;
            };

            let parsed = self
                .parser
                .parse(&content)
                .map_err(|source| ConfigError::InvalidConfigFile {
                    path: path.clone(),
                    source,
                })?;

            tracing::debug!(
                "Loaded {} top-level keys from {}",
                parsed.len(),
                path.display()
            );
            doc = merge_documents(doc, parsed);
        }

        Ok(doc)
    }
}

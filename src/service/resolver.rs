// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration resolver.
//!
//! This module provides the resolver that runs the configured loaders, deep-merges
//! their documents, validates the result and freezes it into a `ResolvedConfig`.

use crate::adapters::{EnvKeyMapper, FileAggregator, MissingDirectoryPolicy};
use crate::domain::document::deep_merge_all;
use crate::domain::{ConfigError, Environment, IntegerCoercion, ResolvedConfig, Result};
use crate::ports::{AcceptAll, ConfigLoader, ConfigParser, SchemaValidator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Options for the standard loader chain.
///
/// Deserializes from camelCase keys so options can be embedded in other
/// configuration documents.
///
/// # Examples
///
/// ```rust
/// use layercfg::service::LoadOptions;
///
/// let options: LoadOptions = serde_json::from_str(
///     r#"{"appName": "foo", "targetDir": "/etc/foo", "configPath": "prod.json"}"#,
/// ).unwrap();
/// assert_eq!(options.app_name.as_deref(), Some("foo"));
/// assert_eq!(options.separator, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadOptions {
    /// Application name; selects environment variables prefixed with its upper-cased form.
    pub app_name: Option<String>,
    /// Separator between environment key segments, `"__"` when unset.
    pub separator: Option<String>,
    /// Directory holding the configuration files, `./config` when unset.
    pub target_dir: Option<PathBuf>,
    /// Override file, absolute or relative to the target directory.
    pub config_path: Option<PathBuf>,
    /// How environment values are turned into integers.
    pub integer_coercion: IntegerCoercion,
    /// What to do when the target directory does not exist.
    pub missing_directory: Option<MissingDirectoryPolicy>,
}

/// Resolves configuration from an ordered list of loaders.
///
/// Loaders run in order and every document is deep-merged onto the ones before
/// it, so later loaders win. The standard chain is the [`FileAggregator`]
/// followed by the [`EnvKeyMapper`]; extra loaders added with
/// [`ConfigResolverBuilder::with_loader`] take precedence over both.
///
/// Every call to [`ConfigResolver::resolve`] performs all I/O afresh.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::Schema;
/// use layercfg::domain::Environment;
/// use layercfg::service::ConfigResolver;
/// use serde_json::json;
///
/// let schema = Schema::from_value(&json!({
///     "properties": {"db": {"properties": {"port": {"type": "uint16"}}}}
/// }))?;
///
/// let resolver = ConfigResolver::builder()
///     .app_name("foo")
///     .environment(Environment::from_iter([("FOO__DB__PORT", "5432")]))
///     .validator(schema)
///     .build()?;
///
/// let config = resolver.resolve()?;
/// assert_eq!(config.get_i64("db.port"), Some(5432));
/// # Ok::<(), layercfg::domain::ConfigError>(())
/// ```
pub struct ConfigResolver<V = AcceptAll> {
    loaders: Vec<Box<dyn ConfigLoader>>,
    validator: V,
}

impl ConfigResolver {
    /// Creates a new resolver builder.
    pub fn builder() -> ConfigResolverBuilder {
        ConfigResolverBuilder::new()
    }
}

impl<V: SchemaValidator> ConfigResolver<V> {
    /// Builds the standard chain from `options`, validating with `validator`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidApplicationName` or `ConfigError::InvalidSeparator`
    /// if the options cannot form an environment prefix.
    pub fn from_options(options: LoadOptions, validator: V) -> Result<Self> {
        ConfigResolverBuilder::new()
            .options(options)
            .validator(validator)
            .build()
    }

    /// Returns the names of the loaders, lowest precedence first.
    pub fn loader_names(&self) -> Vec<&str> {
        self.loaders.iter().map(|loader| loader.name()).collect()
    }

    /// Loads, merges and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first loader error unchanged, or
    /// `ConfigError::ConfigValidationError` carrying every violation when the
    /// merged document does not satisfy the schema.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let documents = self
            .loaders
            .iter()
            .map(|loader| {
                let doc = loader.load()?;
                tracing::debug!(
                    "Loader '{}' produced {} top-level keys",
                    loader.name(),
                    doc.len()
                );
                Ok(doc)
            })
            .collect::<Result<Vec<_>>>()?;

        let merged = Value::Object(deep_merge_all(documents));

        if let Err(violations) = self.validator.validate(&merged) {
            tracing::warn!(
                "Configuration failed validation with {} violation(s)",
                violations.len()
            );
            return Err(ConfigError::ConfigValidationError { violations });
        }

        tracing::info!(
            "Resolved configuration from {} loaders",
            self.loaders.len()
        );
        Ok(ResolvedConfig::from_value(merged))
    }

    /// Resolves the configuration and deserializes it into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`ConfigResolver::resolve`] returns, plus
    /// `ConfigError::TypeConversionError` if the validated document does not fit `T`.
    pub fn resolve_as<T: DeserializeOwned>(&self) -> Result<T> {
        self.resolve()?.deserialize()
    }
}

impl<V> fmt::Debug for ConfigResolver<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.loaders.iter().map(|loader| loader.name()).collect();
        f.debug_struct("ConfigResolver")
            .field("loaders", &names)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a `ConfigResolver`.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::{Document, Environment, Result};
/// use layercfg::service::ConfigResolverBuilder;
/// use serde_json::json;
///
/// # fn main() -> Result<()> {
/// let resolver = ConfigResolverBuilder::new()
///     .target_dir(std::env::temp_dir())
///     .environment(Environment::new())
///     .with_loader(Box::new(|| -> Result<Document> {
///         let mut doc = Document::new();
///         doc.insert("source".to_string(), json!("custom"));
///         Ok(doc)
///     }))
///     .build()?;
///
/// assert_eq!(resolver.loader_names(), vec!["json-file", "env", "custom"]);
/// # Ok(())
/// # }
/// ```
pub struct ConfigResolverBuilder<V = AcceptAll> {
    options: LoadOptions,
    environment: Option<Environment>,
    parser: Option<Arc<dyn ConfigParser>>,
    extra: Vec<Box<dyn ConfigLoader>>,
    validator: V,
}

impl ConfigResolverBuilder {
    /// Creates a new builder with the default options and no schema.
    pub fn new() -> Self {
        Self {
            options: LoadOptions::default(),
            environment: None,
            parser: None,
            extra: Vec::new(),
            validator: AcceptAll,
        }
    }
}

impl<V> ConfigResolverBuilder<V> {
    /// Replaces all options at once.
    pub fn options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.options.app_name = Some(name.into());
        self
    }

    /// Sets the environment key separator.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.options.separator = Some(separator.into());
        self
    }

    /// Sets the directory holding the configuration files.
    pub fn target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.target_dir = Some(dir.into());
        self
    }

    /// Sets the override file.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Sets the integer coercion policy for environment values.
    pub fn integer_coercion(mut self, coercion: IntegerCoercion) -> Self {
        self.options.integer_coercion = coercion;
        self
    }

    /// Sets the policy for a missing target directory.
    pub fn missing_directory(mut self, policy: MissingDirectoryPolicy) -> Self {
        self.options.missing_directory = Some(policy);
        self
    }

    /// Uses a fixed environment snapshot for both standard loaders.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Replaces the parser used for configuration files.
    pub fn parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Appends a loader that takes precedence over the standard chain.
    pub fn with_loader(mut self, loader: Box<dyn ConfigLoader>) -> Self {
        self.extra.push(loader);
        self
    }

    /// Sets the validator every merged document must pass.
    pub fn validator<W: SchemaValidator>(self, validator: W) -> ConfigResolverBuilder<W> {
        ConfigResolverBuilder {
            options: self.options,
            environment: self.environment,
            parser: self.parser,
            extra: self.extra,
            validator,
        }
    }

    /// Builds the resolver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidApplicationName` or `ConfigError::InvalidSeparator`
    /// if the options cannot form an environment prefix.
    pub fn build(self) -> Result<ConfigResolver<V>>
    where
        V: SchemaValidator,
    {
        let options = self.options;

        let mut files = match options.target_dir {
            Some(dir) => FileAggregator::in_dir(dir),
            None => FileAggregator::new(),
        };
        if let Some(path) = options.config_path {
            files = files.config_path(path);
        }
        if let Some(policy) = options.missing_directory {
            files = files.missing_directory(policy);
        }
        if let Some(parser) = self.parser {
            files = files.with_parser(parser);
        }

        let mut env = match options.app_name {
            Some(name) => EnvKeyMapper::for_app(name),
            None => EnvKeyMapper::new(),
        };
        if let Some(separator) = options.separator {
            env = env.separator(separator);
        }
        env = env.integer_coercion(options.integer_coercion);

        if let Some(environment) = self.environment {
            files = files.with_environment(environment.clone());
            env = env.with_environment(environment);
        }

        // Reject a bad name or separator before any I/O happens.
        env.prefix()?;

        let mut loaders: Vec<Box<dyn ConfigLoader>> = vec![Box::new(files), Box::new(env)];
        loaders.extend(self.extra);

        Ok(ConfigResolver {
            loaders,
            validator: self.validator,
        })
    }
}

impl Default for ConfigResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, Violation};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    struct Fixed(&'static str, Value);

    impl ConfigLoader for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn load(&self) -> Result<Document> {
            Ok(doc(self.1.clone()))
        }
    }

    struct Failing;

    impl ConfigLoader for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn load(&self) -> Result<Document> {
            Err(ConfigError::SourceError {
                source_name: "failing".to_string(),
                message: "boom".to_string(),
                source: None,
            })
        }
    }

    struct RequirePort;

    impl SchemaValidator for RequirePort {
        fn validate(&self, value: &Value) -> std::result::Result<(), Vec<Violation>> {
            match value.get("port") {
                Some(v) if v.is_u64() => Ok(()),
                Some(_) => Err(vec![Violation::new("port", "expected uint16")]),
                None => Err(vec![Violation::new("port", "missing required property")]),
            }
        }
    }

    fn resolver(loaders: Vec<Box<dyn ConfigLoader>>) -> ConfigResolver {
        ConfigResolver {
            loaders,
            validator: AcceptAll,
        }
    }

    #[test]
    fn test_later_loaders_win() {
        let resolver = resolver(vec![
            Box::new(Fixed("a", json!({"a": {"x": 1, "y": 2}}))),
            Box::new(Fixed("b", json!({"a": {"y": 3}}))),
        ]);
        assert_eq!(resolver.resolve().unwrap(), json!({"a": {"x": 1, "y": 3}}));
    }

    #[test]
    fn test_no_loaders_resolve_empty_object() {
        assert_eq!(resolver(Vec::new()).resolve().unwrap(), json!({}));
    }

    #[test]
    fn test_loader_error_propagates() {
        let resolver = resolver(vec![
            Box::new(Fixed("a", json!({"a": 1}))),
            Box::new(Failing),
        ]);
        assert!(matches!(
            resolver.resolve(),
            Err(ConfigError::SourceError { .. })
        ));
    }

    #[test]
    fn test_validation_failure() {
        let resolver = ConfigResolver {
            loaders: vec![Box::new(Fixed("a", json!({"port": "x"}))) as Box<dyn ConfigLoader>],
            validator: RequirePort,
        };
        let err = resolver.resolve().unwrap_err();
        assert_eq!(
            err.violations(),
            Some(&[Violation::new("port", "expected uint16")][..])
        );
    }

    #[test]
    fn test_resolve_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Settings {
            port: u16,
        }

        let resolver = ConfigResolver {
            loaders: vec![Box::new(Fixed("a", json!({"port": 8080}))) as Box<dyn ConfigLoader>],
            validator: RequirePort,
        };
        assert_eq!(
            resolver.resolve_as::<Settings>().unwrap(),
            Settings { port: 8080 }
        );

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            port: String,
        }
        assert!(matches!(
            resolver.resolve_as::<Wrong>(),
            Err(ConfigError::TypeConversionError { .. })
        ));
    }

    #[test]
    fn test_builder_standard_chain() {
        let resolver = ConfigResolver::builder()
            .app_name("foo")
            .environment(Environment::new())
            .with_loader(Box::new(Fixed("extra", json!({}))))
            .build()
            .unwrap();
        assert_eq!(resolver.loader_names(), vec!["json-file", "env", "extra"]);
    }

    #[test]
    fn test_builder_rejects_invalid_app_name() {
        let result = ConfigResolver::builder().app_name("my app").build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidApplicationName { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_empty_separator() {
        let result = ConfigResolver::builder().app_name("foo").separator("").build();
        assert!(matches!(result, Err(ConfigError::InvalidSeparator)));
    }

    #[test]
    fn test_injected_environment_feeds_mapper() {
        let resolver = ConfigResolver::builder()
            .app_name("foo")
            .target_dir(std::env::temp_dir().join("layercfg-resolver-no-such-dir"))
            .missing_directory(MissingDirectoryPolicy::Ignore)
            .environment(Environment::from_iter([
                ("FOO__SERVER__PORT", "8080"),
                ("BAR__SERVER__PORT", "9090"),
            ]))
            .build()
            .unwrap();
        assert_eq!(
            resolver.resolve().unwrap(),
            json!({"server": {"port": 8080}})
        );
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: LoadOptions = serde_json::from_value(json!({
            "appName": "foo",
            "separator": "_",
            "targetDir": "/etc/foo",
            "configPath": "override.json",
            "integerCoercion": "lenient",
            "missingDirectory": "ignore"
        }))
        .unwrap();
        assert_eq!(
            options,
            LoadOptions {
                app_name: Some("foo".to_string()),
                separator: Some("_".to_string()),
                target_dir: Some(PathBuf::from("/etc/foo")),
                config_path: Some(PathBuf::from("override.json")),
                integer_coercion: IntegerCoercion::Lenient,
                missing_directory: Some(MissingDirectoryPolicy::Ignore),
            }
        );
    }

    #[test]
    fn test_debug_lists_loaders() {
        let resolver = resolver(vec![Box::new(Fixed("a", json!({})))]);
        assert_eq!(format!("{:?}", resolver), "ConfigResolver { loaders: [\"a\"], .. }");
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered, schema-validated application configuration.
//!
//! This crate resolves application configuration from JSON files and environment
//! variables, deep-merges the layers, validates the merged document against a
//! schema and returns an immutable snapshot.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and logic (`KeyPath`, documents and deep merge,
//!   coercion, `ResolvedConfig`, errors)
//! - **Ports**: Trait definitions that define interfaces (`ConfigLoader`,
//!   `ConfigParser`, `SchemaValidator`)
//! - **Adapters**: The environment key mapper, the JSON file aggregator and the
//!   JSON Type Definition validator
//! - **Service**: The resolver that orchestrates everything
//!
//! # Precedence
//!
//! From lowest to highest:
//!
//! 1. `config/default.application.json`
//! 2. `config/application.json`
//! 3. the override file (`configPath`, else `$APPLICATION_CONFIG`)
//! 4. environment variables named `<APP>__SEGMENT__SEGMENT`
//!
//! Mappings merge recursively; scalars, arrays and `null` replace.
//!
//! # Feature Flags
//!
//! - `cli`: Build the `layercfg` command-line tool (default)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use layercfg::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Db {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     db: Db,
//! }
//!
//! # fn main() -> Result<()> {
//! let schema: Schema = r#"{
//!     "properties": {
//!         "db": {
//!             "properties": {"host": {"type": "string"}, "port": {"type": "uint16"}}
//!         }
//!     }
//! }"#
//! .parse()?;
//!
//! let options = LoadOptions {
//!     app_name: Some("foo".to_string()),
//!     ..LoadOptions::default()
//! };
//!
//! // FOO__DB__HOST=db.internal overrides config/application.json
//! let settings: Settings = layercfg::load_config_as(&schema, options)?;
//! println!("{}:{}", settings.db.host, settings.db.port);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

use domain::{ResolvedConfig, Result};
use ports::SchemaValidator;
use serde::de::DeserializeOwned;
use service::{ConfigResolver, LoadOptions};

/// Resolves configuration with the standard loader chain and validates it against `schema`.
///
/// # Errors
///
/// Any `ConfigError` raised while building the chain, loading, or validating.
pub fn load_config<V>(schema: &V, options: LoadOptions) -> Result<ResolvedConfig>
where
    V: SchemaValidator + ?Sized,
{
    ConfigResolver::from_options(options, schema)?.resolve()
}

/// Like [`load_config`], then deserializes the validated snapshot into `T`.
///
/// # Errors
///
/// Any error of [`load_config`], or `ConfigError::TypeConversionError`.
pub fn load_config_as<T, V>(schema: &V, options: LoadOptions) -> Result<T>
where
    T: DeserializeOwned,
    V: SchemaValidator + ?Sized,
{
    ConfigResolver::from_options(options, schema)?.resolve_as()
}

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::{EnvKeyMapper, FileAggregator, MissingDirectoryPolicy, Schema};
    pub use crate::domain::{
        ConfigError, Document, Environment, IntegerCoercion, KeyPath, ResolvedConfig, Result,
        Violation,
    };
    pub use crate::ports::{ConfigLoader, ConfigParser, SchemaValidator};
    pub use crate::service::{ConfigResolver, LoadOptions};
    pub use crate::{load_config, load_config_as};
}

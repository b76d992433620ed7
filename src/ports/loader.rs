// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader trait definition.
//!
//! This module defines the `ConfigLoader` trait, which is the primary port (interface)
//! for producing configuration documents. The file aggregator and the environment
//! key mapper implement it, and so does any closure returning a document.

use crate::domain::{Document, Result};

/// A trait for components that produce a configuration document on demand.
///
/// A loader is a zero-argument operation: every call to [`ConfigLoader::load`]
/// performs its I/O afresh and builds a new document. Loaders carry no mutable
/// state, so one loader can serve concurrent resolutions.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::{Document, Result};
/// use layercfg::ports::ConfigLoader;
/// use serde_json::json;
///
/// struct Defaults;
///
/// impl ConfigLoader for Defaults {
///     fn name(&self) -> &str {
///         "defaults"
///     }
///
///     fn load(&self) -> Result<Document> {
///         let mut doc = Document::new();
///         doc.insert("port".to_string(), json!(8080));
///         Ok(doc)
///     }
/// }
///
/// assert_eq!(Defaults.load().unwrap()["port"], json!(8080));
/// ```
pub trait ConfigLoader: Send + Sync {
    /// Returns the name of this loader, used in log messages and errors.
    fn name(&self) -> &str;

    /// Produces a fresh configuration document.
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The document, possibly empty
    /// * `Err(ConfigError)` - Loading failed; the resolution must stop
    fn load(&self) -> Result<Document>;
}

impl<F> ConfigLoader for F
where
    F: Fn() -> Result<Document> + Send + Sync,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn load(&self) -> Result<Document> {
        self()
    }
}

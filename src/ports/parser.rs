// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which provides an interface for
//! turning the text of a configuration file into a document.

use crate::domain::Document;

/// The error type returned by parsers.
///
/// Parsers do not know which file they are reading; the caller wraps this error
/// together with the path into `ConfigError::InvalidConfigFile`.
pub type ParseFailure = Box<dyn std::error::Error + Send + Sync>;

/// A trait for parsing configuration files.
///
/// Parsers keep the nested structure of the file: the result is a document
/// whose values may themselves be objects or arrays. Content whose top level
/// is not a mapping must be rejected.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::Document;
/// use layercfg::ports::{ConfigParser, ParseFailure};
///
/// struct EmptyParser;
///
/// impl ConfigParser for EmptyParser {
///     fn parse(&self, _content: &str) -> Result<Document, ParseFailure> {
///         Ok(Document::new())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["empty"]
///     }
/// }
///
/// assert!(EmptyParser.parse("anything").unwrap().is_empty());
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses configuration content into a document.
    ///
    /// # Arguments
    ///
    /// * `content` - The full text of the configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The parsed top-level mapping
    /// * `Err(ParseFailure)` - The content is malformed or not a mapping
    fn parse(&self, content: &str) -> Result<Document, ParseFailure>;

    /// Returns the file extensions handled by this parser, without the dot.
    fn supported_extensions(&self) -> &[&str];
}

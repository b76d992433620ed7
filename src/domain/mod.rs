// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core business logic and types.
//!
//! This module contains the core domain types and logic for the configuration crate:
//! key paths, documents and their deep merge, value coercion, environment snapshots,
//! the resolved configuration snapshot and the error type. It performs no I/O.

pub mod coercion;
pub mod document;
pub mod environment;
pub mod errors;
pub mod key_path;
pub mod resolved;

// Re-export commonly used types
pub use coercion::IntegerCoercion;
pub use document::Document;
pub use environment::Environment;
pub use errors::{ConfigError, Result, Violation};
pub use key_path::KeyPath;
pub use resolved::ResolvedConfig;

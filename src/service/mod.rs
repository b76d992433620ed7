// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the configuration resolver.
//!
//! This module orchestrates the loaders and the schema validator into a single
//! resolution pipeline.

pub mod resolver;

// Re-export commonly used types
pub use resolver::{ConfigResolver, ConfigResolverBuilder, LoadOptions};

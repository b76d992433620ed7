// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing loader and validator implementations.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer: the environment key mapper and the JSON file aggregator implement
//! `ConfigLoader`, and the JSON Type Definition schema implements `SchemaValidator`.

pub mod env_var;
pub mod json_file;
pub mod jtd;

pub use env_var::EnvKeyMapper;
pub use json_file::{FileAggregator, JsonParser, MissingDirectoryPolicy};
pub use jtd::Schema;

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema validator trait definition.
//!
//! This module defines the `SchemaValidator` trait, the gate every merged document
//! must pass before it becomes a resolved configuration.

use crate::domain::Violation;
use serde_json::Value;

/// A trait for validating a merged configuration document against a schema.
///
/// Implementations must report every violation they find, not only the first
/// one, so the caller can fix a broken configuration in a single pass.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::Violation;
/// use layercfg::ports::SchemaValidator;
/// use serde_json::{json, Value};
///
/// struct RequiresName;
///
/// impl SchemaValidator for RequiresName {
///     fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
///         match value.get("name") {
///             Some(Value::String(_)) => Ok(()),
///             _ => Err(vec![Violation::new("name", "expected string")]),
///         }
///     }
/// }
///
/// assert!(RequiresName.validate(&json!({"name": "app"})).is_ok());
/// assert!(RequiresName.validate(&json!({})).is_err());
/// ```
pub trait SchemaValidator: Send + Sync {
    /// Validates `value`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The value satisfies the schema
    /// * `Err(violations)` - Every violation found, never empty
    fn validate(&self, value: &Value) -> Result<(), Vec<Violation>>;
}

/// A validator that accepts every document.
///
/// Useful when the application validates by deserializing into its own types.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl SchemaValidator for AcceptAll {
    fn validate(&self, _value: &Value) -> Result<(), Vec<Violation>> {
        Ok(())
    }
}

impl<V: SchemaValidator + ?Sized> SchemaValidator for &V {
    fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        (**self).validate(value)
    }
}

impl<V: SchemaValidator + ?Sized> SchemaValidator for Box<V> {
    fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        (**self).validate(value)
    }
}

impl<V: SchemaValidator + ?Sized> SchemaValidator for std::sync::Arc<V> {
    fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        (**self).validate(value)
    }
}

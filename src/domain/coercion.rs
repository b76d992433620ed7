// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coercion of raw environment strings into typed JSON scalars.
//!
//! Environment variables only carry strings. Before they are merged with file
//! documents they are coerced: the exact tokens `true` and `false` become
//! booleans, integer tokens become numbers and everything else stays a string.
//! Floats and `null` are never recognized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How integer tokens are recognized.
///
/// # Examples
///
/// ```
/// use layercfg::domain::IntegerCoercion;
/// use serde_json::json;
///
/// assert_eq!(IntegerCoercion::Strict.coerce("5432x"), json!("5432x"));
/// assert_eq!(IntegerCoercion::Lenient.coerce("5432x"), json!(5432));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerCoercion {
    /// The whole string must be a base-10 integer (optional sign) that fits in an `i64`.
    #[default]
    Strict,
    /// A leading run of digits is enough; anything after it is ignored.
    ///
    /// Leading whitespace and an optional sign are accepted before the digits.
    /// Values that overflow an `i64` are kept as strings.
    Lenient,
}

impl IntegerCoercion {
    /// Coerces a raw environment value into a JSON scalar.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::IntegerCoercion;
    /// use serde_json::json;
    ///
    /// let policy = IntegerCoercion::default();
    /// assert_eq!(policy.coerce("true"), json!(true));
    /// assert_eq!(policy.coerce("false"), json!(false));
    /// assert_eq!(policy.coerce("5432"), json!(5432));
    /// assert_eq!(policy.coerce("localhost"), json!("localhost"));
    /// ```
    pub fn coerce(self, raw: &str) -> Value {
        match raw {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        let parsed = match self {
            IntegerCoercion::Strict => parse_strict(raw),
            IntegerCoercion::Lenient => parse_leading(raw),
        };

        match parsed {
            Some(n) => Value::from(n),
            None => Value::String(raw.to_string()),
        }
    }
}

/// Coerces a raw value with the default (strict) policy.
pub fn coerce(raw: &str) -> Value {
    IntegerCoercion::Strict.coerce(raw)
}

fn parse_strict(raw: &str) -> Option<i64> {
    // i64::from_str accepts an optional leading sign
    raw.parse::<i64>().ok()
}

fn parse_leading(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    format!("{}{}", sign, &rest[..digits]).parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans_are_case_sensitive() {
        assert_eq!(coerce("true"), json!(true));
        assert_eq!(coerce("false"), json!(false));
        assert_eq!(coerce("True"), json!("True"));
        assert_eq!(coerce("FALSE"), json!("FALSE"));
        assert_eq!(coerce("yes"), json!("yes"));
    }

    #[test]
    fn test_strict_integers() {
        assert_eq!(coerce("5432"), json!(5432));
        assert_eq!(coerce("-42"), json!(-42));
        assert_eq!(coerce("+7"), json!(7));
        assert_eq!(coerce("0"), json!(0));
    }

    #[test]
    fn test_strict_rejects_partial_tokens() {
        assert_eq!(coerce("5432x"), json!("5432x"));
        assert_eq!(coerce(" 5432"), json!(" 5432"));
        assert_eq!(coerce("3.14"), json!("3.14"));
        assert_eq!(coerce("1e3"), json!("1e3"));
        assert_eq!(coerce(""), json!(""));
    }

    #[test]
    fn test_strict_overflow_stays_string() {
        assert_eq!(
            coerce("99999999999999999999"),
            json!("99999999999999999999")
        );
    }

    #[test]
    fn test_no_null_or_float_recognition() {
        assert_eq!(coerce("null"), json!("null"));
        assert_eq!(coerce("1.5"), json!("1.5"));
    }

    #[test]
    fn test_lenient_leading_digits() {
        let policy = IntegerCoercion::Lenient;
        assert_eq!(policy.coerce("5432x"), json!(5432));
        assert_eq!(policy.coerce("  12abc"), json!(12));
        assert_eq!(policy.coerce("-3.9"), json!(-3));
        assert_eq!(policy.coerce("1e3"), json!(1));
    }

    #[test]
    fn test_lenient_without_digits_stays_string() {
        let policy = IntegerCoercion::Lenient;
        assert_eq!(policy.coerce("localhost"), json!("localhost"));
        assert_eq!(policy.coerce("-"), json!("-"));
        assert_eq!(policy.coerce(""), json!(""));
    }

    #[test]
    fn test_lenient_keeps_booleans() {
        let policy = IntegerCoercion::Lenient;
        assert_eq!(policy.coerce("true"), json!(true));
        assert_eq!(policy.coerce("false"), json!(false));
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: IntegerCoercion = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(policy, IntegerCoercion::Lenient);
    }
}

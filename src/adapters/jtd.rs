// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON Type Definition schemas.
//!
//! [`Schema`] compiles a JSON Type Definition (RFC 8927) document once and then
//! validates configuration documents against it, reporting every violation
//! with the dot-joined key path of the offending value.
//!
//! Supported forms: empty, `type`, `enum`, `elements`, `properties` (with
//! `optionalProperties` and `additionalProperties`), `values`, `discriminator`
//! and `ref` into root-level `definitions`. Every form accepts `nullable` and
//! `metadata`; metadata is ignored during validation.

use crate::domain::{ConfigError, Result, Violation};
use crate::ports::SchemaValidator;
use chrono::DateTime;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Maximum number of `ref` hops followed while validating a single value.
const MAX_REF_DEPTH: usize = 64;

const KEYWORDS: &[&str] = &[
    "definitions",
    "nullable",
    "metadata",
    "ref",
    "type",
    "enum",
    "elements",
    "properties",
    "optionalProperties",
    "additionalProperties",
    "values",
    "discriminator",
    "mapping",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypeName {
    Boolean,
    String,
    Timestamp,
    Float32,
    Float64,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
}

impl TypeName {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => TypeName::Boolean,
            "string" => TypeName::String,
            "timestamp" => TypeName::Timestamp,
            "float32" => TypeName::Float32,
            "float64" => TypeName::Float64,
            "int8" => TypeName::Int8,
            "uint8" => TypeName::Uint8,
            "int16" => TypeName::Int16,
            "uint16" => TypeName::Uint16,
            "int32" => TypeName::Int32,
            "uint32" => TypeName::Uint32,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            TypeName::Boolean => "boolean",
            TypeName::String => "string",
            TypeName::Timestamp => "timestamp",
            TypeName::Float32 => "float32",
            TypeName::Float64 => "float64",
            TypeName::Int8 => "int8",
            TypeName::Uint8 => "uint8",
            TypeName::Int16 => "int16",
            TypeName::Uint16 => "uint16",
            TypeName::Int32 => "int32",
            TypeName::Uint32 => "uint32",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            TypeName::Boolean => value.is_boolean(),
            TypeName::String => value.is_string(),
            TypeName::Timestamp => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            TypeName::Float32 | TypeName::Float64 => value.is_number(),
            TypeName::Int8 => integer_in(value, i8::MIN.into(), i8::MAX.into()),
            TypeName::Uint8 => integer_in(value, 0.0, u8::MAX.into()),
            TypeName::Int16 => integer_in(value, i16::MIN.into(), i16::MAX.into()),
            TypeName::Uint16 => integer_in(value, 0.0, u16::MAX.into()),
            TypeName::Int32 => integer_in(value, i32::MIN.into(), i32::MAX.into()),
            TypeName::Uint32 => integer_in(value, 0.0, u32::MAX.into()),
        }
    }
}

// Integer types accept any number with a zero fractional part, so `5432.0` is an int32.
fn integer_in(value: &Value, min: f64, max: f64) -> bool {
    value
        .as_f64()
        .is_some_and(|n| n.fract() == 0.0 && n >= min && n <= max)
}

#[derive(Clone, Debug, PartialEq)]
struct Node {
    nullable: bool,
    form: Form,
}

#[derive(Clone, Debug, PartialEq)]
enum Form {
    Empty,
    Ref(String),
    Type(TypeName),
    Enum(Vec<String>),
    Elements(Box<Node>),
    Properties {
        required: BTreeMap<String, Node>,
        optional: BTreeMap<String, Node>,
        additional: bool,
    },
    Values(Box<Node>),
    Discriminator {
        tag: String,
        mapping: BTreeMap<String, Node>,
    },
}

fn invalid(at: &str, message: impl std::fmt::Display) -> ConfigError {
    let at = if at.is_empty() { "/" } else { at };
    ConfigError::InvalidSchema {
        message: format!("at {}: {}", at, message),
    }
}

fn compile_map(
    value: &Value,
    at: &str,
    names: &BTreeSet<String>,
) -> Result<BTreeMap<String, Node>> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid(at, "expected an object of schemas"))?;

    map.iter()
        .map(|(key, schema)| {
            let node = compile(schema, &format!("{}/{}", at, key), false, names)?;
            Ok((key.clone(), node))
        })
        .collect()
}

fn compile(value: &Value, at: &str, root: bool, names: &BTreeSet<String>) -> Result<Node> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(at, "schema must be an object"))?;

    for key in obj.keys() {
        if !KEYWORDS.contains(&key.as_str()) {
            return Err(invalid(at, format!("unknown keyword '{}'", key)));
        }
    }
    if !root && obj.contains_key("definitions") {
        return Err(invalid(at, "definitions are only allowed at the root"));
    }

    let nullable = match obj.get("nullable") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(invalid(at, "nullable must be a boolean")),
    };
    if obj.get("metadata").is_some_and(|m| !m.is_object()) {
        return Err(invalid(at, "metadata must be an object"));
    }

    let form = compile_form(obj, at, names)?;
    Ok(Node { nullable, form })
}

fn compile_form(obj: &Map<String, Value>, at: &str, names: &BTreeSet<String>) -> Result<Form> {
    let has = |key: &str| obj.contains_key(key);
    let forms = [
        ("ref", has("ref")),
        ("type", has("type")),
        ("enum", has("enum")),
        ("elements", has("elements")),
        (
            "properties",
            has("properties") || has("optionalProperties") || has("additionalProperties"),
        ),
        ("values", has("values")),
        ("discriminator", has("discriminator") || has("mapping")),
    ];
    let present: Vec<&str> = forms
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();
    if present.len() > 1 {
        return Err(invalid(
            at,
            format!("conflicting forms: {}", present.join(", ")),
        ));
    }

    if let Some(name) = obj.get("ref") {
        let name = name
            .as_str()
            .ok_or_else(|| invalid(at, "ref must be a string"))?;
        if !names.contains(name) {
            return Err(invalid(at, format!("undefined definition '{}'", name)));
        }
        return Ok(Form::Ref(name.to_string()));
    }

    if let Some(name) = obj.get("type") {
        let name = name
            .as_str()
            .ok_or_else(|| invalid(at, "type must be a string"))?;
        let type_name =
            TypeName::parse(name).ok_or_else(|| invalid(at, format!("unknown type '{}'", name)))?;
        return Ok(Form::Type(type_name));
    }

    if let Some(values) = obj.get("enum") {
        let values = values
            .as_array()
            .ok_or_else(|| invalid(at, "enum must be an array"))?;
        if values.is_empty() {
            return Err(invalid(at, "enum must not be empty"));
        }
        let mut seen = BTreeSet::new();
        let mut variants = Vec::with_capacity(values.len());
        for value in values {
            let variant = value
                .as_str()
                .ok_or_else(|| invalid(at, "enum values must be strings"))?;
            if !seen.insert(variant) {
                return Err(invalid(at, format!("duplicate enum value '{}'", variant)));
            }
            variants.push(variant.to_string());
        }
        return Ok(Form::Enum(variants));
    }

    if let Some(elements) = obj.get("elements") {
        let inner = compile(elements, &format!("{}/elements", at), false, names)?;
        return Ok(Form::Elements(Box::new(inner)));
    }

    if has("properties") || has("optionalProperties") || has("additionalProperties") {
        if !has("properties") && !has("optionalProperties") {
            return Err(invalid(
                at,
                "additionalProperties requires properties or optionalProperties",
            ));
        }
        let required = match obj.get("properties") {
            Some(v) => compile_map(v, &format!("{}/properties", at), names)?,
            None => BTreeMap::new(),
        };
        let optional = match obj.get("optionalProperties") {
            Some(v) => compile_map(v, &format!("{}/optionalProperties", at), names)?,
            None => BTreeMap::new(),
        };
        if let Some(key) = required.keys().find(|k| optional.contains_key(*k)) {
            return Err(invalid(
                at,
                format!("property '{}' is both required and optional", key),
            ));
        }
        let additional = match obj.get("additionalProperties") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid(at, "additionalProperties must be a boolean")),
        };
        return Ok(Form::Properties {
            required,
            optional,
            additional,
        });
    }

    if let Some(values) = obj.get("values") {
        let inner = compile(values, &format!("{}/values", at), false, names)?;
        return Ok(Form::Values(Box::new(inner)));
    }

    if has("discriminator") || has("mapping") {
        let tag = obj
            .get("discriminator")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(at, "discriminator must be a string"))?;
        let mapping_value = obj
            .get("mapping")
            .ok_or_else(|| invalid(at, "discriminator requires mapping"))?;
        let mapping = compile_map(mapping_value, &format!("{}/mapping", at), names)?;

        for (variant, node) in &mapping {
            let variant_at = format!("{}/mapping/{}", at, variant);
            match &node.form {
                Form::Properties {
                    required, optional, ..
                } if !node.nullable => {
                    if required.contains_key(tag) || optional.contains_key(tag) {
                        return Err(invalid(
                            &variant_at,
                            format!("mapping redefines discriminator '{}'", tag),
                        ));
                    }
                }
                _ => {
                    return Err(invalid(
                        &variant_at,
                        "mapping values must be non-nullable properties schemas",
                    ))
                }
            }
        }

        return Ok(Form::Discriminator {
            tag: tag.to_string(),
            mapping,
        });
    }

    Ok(Form::Empty)
}

/// A compiled JSON Type Definition schema.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::Schema;
/// use layercfg::ports::SchemaValidator;
/// use serde_json::json;
///
/// let schema = Schema::from_value(&json!({
///     "properties": {
///         "db": {
///             "properties": {
///                 "host": {"type": "string"},
///                 "port": {"type": "int32"}
///             },
///             "optionalProperties": {
///                 "ssl": {"type": "boolean"}
///             }
///         }
///     }
/// }))?;
///
/// assert!(schema.validate(&json!({"db": {"host": "localhost", "port": 5432}})).is_ok());
///
/// let violations = schema
///     .validate(&json!({"db": {"host": "localhost", "ssl": "foo"}}))
///     .unwrap_err();
/// assert_eq!(violations.len(), 2);
/// assert_eq!(violations[0].path, "db.port");
/// assert_eq!(violations[1].path, "db.ssl");
/// # Ok::<(), layercfg::domain::ConfigError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    root: Node,
    definitions: BTreeMap<String, Node>,
}

impl Schema {
    /// Returns the empty schema, which accepts every value.
    pub fn empty() -> Self {
        Self {
            root: Node {
                nullable: false,
                form: Form::Empty,
            },
            definitions: BTreeMap::new(),
        }
    }

    /// Compiles a schema from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSchema` if the value is not a well-formed
    /// JSON Type Definition.
    pub fn from_value(value: &Value) -> Result<Self> {
        let definitions_value = value.get("definitions");
        let names: BTreeSet<String> = match definitions_value {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(_) => return Err(invalid("/definitions", "expected an object of schemas")),
            None => BTreeSet::new(),
        };

        let definitions = match definitions_value {
            Some(v) => compile_map(v, "/definitions", &names)?,
            None => BTreeMap::new(),
        };
        let root = compile(value, "", true, &names)?;

        tracing::debug!("Compiled schema with {} definitions", definitions.len());
        Ok(Self { root, definitions })
    }

    /// Returns every violation of `value`, in document order.
    pub fn violations(&self, value: &Value) -> Vec<Violation> {
        let mut validation = Validation {
            definitions: &self.definitions,
            path: Vec::new(),
            violations: Vec::new(),
        };
        validation.check(&self.root, value, 0, None);
        validation.violations
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for Schema {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s).map_err(|e| ConfigError::InvalidSchema {
            message: format!("schema is not valid JSON: {}", e),
        })?;
        Self::from_value(&value)
    }
}

impl SchemaValidator for Schema {
    fn validate(&self, value: &Value) -> std::result::Result<(), Vec<Violation>> {
        let violations = self.violations(value);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

struct Validation<'s> {
    definitions: &'s BTreeMap<String, Node>,
    path: Vec<String>,
    violations: Vec<Violation>,
}

impl Validation<'_> {
    fn report(&mut self, message: impl Into<String>) {
        self.violations
            .push(Violation::new(self.path.join("."), message));
    }

    fn report_at(&mut self, key: &str, message: impl Into<String>) {
        self.path.push(key.to_string());
        self.report(message);
        self.path.pop();
    }

    // Child values start a fresh ref chain
    fn check_at(&mut self, key: String, node: &Node, value: &Value) {
        self.path.push(key);
        self.check(node, value, 0, None);
        self.path.pop();
    }

    fn check(&mut self, node: &Node, value: &Value, depth: usize, tag: Option<&str>) {
        if node.nullable && value.is_null() {
            return;
        }

        match &node.form {
            Form::Empty => {}
            Form::Ref(name) => {
                if depth >= MAX_REF_DEPTH {
                    self.report("maximum reference depth exceeded");
                    return;
                }
                let definitions = self.definitions;
                if let Some(target) = definitions.get(name) {
                    self.check(target, value, depth + 1, None);
                }
            }
            Form::Type(type_name) => {
                if !type_name.accepts(value) {
                    self.report(format!("expected {}", type_name.as_str()));
                }
            }
            Form::Enum(variants) => {
                let matched = value
                    .as_str()
                    .is_some_and(|s| variants.iter().any(|v| v == s));
                if !matched {
                    let expected: Vec<String> =
                        variants.iter().map(|v| format!("\"{}\"", v)).collect();
                    self.report(format!("expected one of {}", expected.join(", ")));
                }
            }
            Form::Elements(inner) => match value.as_array() {
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        self.check_at(index.to_string(), inner, item);
                    }
                }
                None => self.report("expected array"),
            },
            Form::Properties {
                required,
                optional,
                additional,
            } => {
                let Some(map) = value.as_object() else {
                    self.report("expected object");
                    return;
                };

                for (key, schema) in required {
                    match map.get(key) {
                        Some(v) => self.check_at(key.clone(), schema, v),
                        None => self.report_at(key, "missing required property"),
                    }
                }
                for (key, schema) in optional {
                    if let Some(v) = map.get(key) {
                        self.check_at(key.clone(), schema, v);
                    }
                }
                if !additional {
                    for key in map.keys() {
                        let known = required.contains_key(key)
                            || optional.contains_key(key)
                            || tag == Some(key.as_str());
                        if !known {
                            self.report_at(key, "unexpected property");
                        }
                    }
                }
            }
            Form::Values(inner) => match value.as_object() {
                Some(map) => {
                    for (key, v) in map {
                        self.check_at(key.clone(), inner, v);
                    }
                }
                None => self.report("expected object"),
            },
            Form::Discriminator { tag, mapping } => {
                let Some(map) = value.as_object() else {
                    self.report("expected object");
                    return;
                };

                match map.get(tag) {
                    None => self.report_at(tag, "missing discriminator"),
                    Some(Value::String(variant)) => match mapping.get(variant) {
                        Some(schema) => self.check(schema, value, depth, Some(tag.as_str())),
                        None => self.report_at(tag, "unknown discriminator value"),
                    },
                    Some(_) => self.report_at(tag, "expected string"),
                }
            }
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helper utilities for integration tests.

use layercfg::adapters::Schema;
use layercfg::domain::Environment;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Installs a test-writer subscriber so `RUST_LOG=debug cargo test` shows library logs.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Creates an empty configuration directory.
#[allow(dead_code)]
pub fn config_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Writes `value` as JSON to `dir/name` and returns the full path.
#[allow(dead_code)]
pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).expect("failed to write config file");
    path
}

/// Builds an environment snapshot from name/value pairs.
#[allow(dead_code)]
pub fn env(pairs: &[(&str, &str)]) -> Environment {
    pairs.iter().copied().collect()
}

/// Schema accepting the file fixtures below.
#[allow(dead_code)]
pub fn file_schema() -> Schema {
    Schema::from_value(&json!({
        "optionalProperties": {
            "name": {"type": "string"},
            "db": {
                "optionalProperties": {
                    "host": {"type": "string"},
                    "port": {"type": "int32"},
                    "ssl": {"type": "boolean"}
                }
            },
            "foo": {"elements": {"type": "int32"}},
            "sendgrid": {"properties": {"key": {"type": "string"}}}
        }
    }))
    .expect("file schema compiles")
}

/// Schema for configuration supplied through `FOO__*` variables.
#[allow(dead_code)]
pub fn env_schema() -> Schema {
    Schema::from_value(&json!({
        "properties": {
            "db": {
                "properties": {
                    "host": {"type": "string"},
                    "port": {"type": "int32"}
                },
                "optionalProperties": {
                    "ssl": {"type": "boolean"}
                }
            },
            "fooBar": {
                "properties": {
                    "foo": {"type": "string"},
                    "bar": {"type": "boolean"}
                }
            }
        },
        "optionalProperties": {
            "env": {"type": "string"}
        }
    }))
    .expect("env schema compiles")
}

/// Baseline file contents.
#[allow(dead_code)]
pub fn base_config() -> Value {
    json!({
        "name": "app_name",
        "db": {"host": "localhost", "port": 5432}
    })
}

/// Deployment overrides layered on [`base_config`].
#[allow(dead_code)]
pub fn deployment_config() -> Value {
    json!({
        "db": {"ssl": true},
        "foo": [1, 2, 3]
    })
}

/// Override file contents.
#[allow(dead_code)]
pub fn override_config() -> Value {
    json!({
        "db": {"host": "host.com", "port": 5444, "ssl": false},
        "sendgrid": {"key": "<sendgrid_key>"}
    })
}

/// Variables for the application `foo` (prefix `FOO`).
#[allow(dead_code)]
pub fn foo_vars(prefix: &str) -> Vec<(String, String)> {
    [
        ("DB__HOST", "localhost"),
        ("DB__PORT", "5432"),
        ("DB__SSL", "true"),
        ("FOO_BAR__FOO", "foo"),
        ("FOO_BAR__BAR", "false"),
    ]
    .iter()
    .map(|(k, v)| (format!("{}__{}", prefix, k), v.to_string()))
    .collect()
}

/// The document [`foo_vars`] maps to.
#[allow(dead_code)]
pub fn foo_expected() -> Value {
    json!({
        "db": {"host": "localhost", "port": 5432, "ssl": true},
        "fooBar": {"foo": "foo", "bar": false}
    })
}

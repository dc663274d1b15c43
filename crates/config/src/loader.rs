//! Turn a configuration file into one [`OptionsContext`] per module scope.
//!
//! ```toml
//! [network]
//! transport = "tls"
//! port = 6514
//!
//! [network.tls]
//! cert = "${CERT_DIR}/server.pem"
//! ```
//!
//! yields a `network` scope holding `transport`, `port` and `tls.cert`.

use std::{collections::BTreeMap, path::Path};

use {
    serde_json::{Map, Value},
    tracing::debug,
};

use crate::{
    context::OptionsContext,
    env_subst::substitute_env,
    error::{Error, Result},
};

/// Supported file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Format for `path`; files without an extension are read as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        match ext {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

/// Read a file into a string, attaching the path to IO errors.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Load every scope of the config file at `path`.
pub fn load_contexts(path: &Path) -> Result<BTreeMap<String, OptionsContext>> {
    let raw = read_file(path)?;
    let contexts = parse_contexts(&raw, Format::from_path(path)?)?;
    debug!(path = %path.display(), scopes = contexts.len(), "loaded option scopes");
    Ok(contexts)
}

/// Parse config text in the given format into scopes.
pub fn parse_contexts(raw: &str, format: Format) -> Result<BTreeMap<String, OptionsContext>> {
    contexts_from_value(&parse_value(raw, format)?)
}

fn parse_value(raw: &str, format: Format) -> Result<Value> {
    match format {
        Format::Toml => Ok(toml_to_json(toml::from_str(raw)?)),
        Format::Yaml => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        Format::Json => Ok(serde_json::from_str(raw)?),
    }
}

/// Datetimes become their TOML spelling instead of serde's private wrapper.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Top-level tables become scopes; anything else at the top is rejected.
pub fn contexts_from_value(value: &Value) -> Result<BTreeMap<String, OptionsContext>> {
    let Value::Object(scopes) = value else {
        return Err(Error::UnsupportedValue {
            path: "<root>".into(),
        });
    };

    let mut contexts = BTreeMap::new();
    for (scope, body) in scopes {
        let Value::Object(table) = body else {
            return Err(Error::UnsupportedValue {
                path: scope.clone(),
            });
        };
        let mut values = BTreeMap::new();
        flatten(scope, table, "", &mut values)?;
        contexts.insert(scope.clone(), OptionsContext::new(values));
    }
    Ok(contexts)
}

fn flatten(
    scope: &str,
    table: &Map<String, Value>,
    prefix: &str,
    out: &mut BTreeMap<String, String>,
) -> Result<()> {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let raw = match value {
            Value::String(s) => substitute_env(s),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Object(nested) => {
                flatten(scope, nested, &name, out)?;
                continue;
            },
            Value::Array(_) | Value::Null => {
                return Err(Error::UnsupportedValue {
                    path: format!("{scope}.{name}"),
                });
            },
        };
        out.insert(name, raw);
    }
    Ok(())
}

//! Declarative module schemas.
//!
//! A schema lists, per module, which options exist and which constraints
//! apply. [`ModuleSchema::build`] turns that description into the same
//! decorator chains an owner would assemble by hand:
//!
//! ```toml
//! [[modules.network.options]]
//! name = "transport"
//! one_of = ["tcp", "udp", "tls"]
//! default = "tcp"
//!
//! [[modules.network.options]]
//! name = "port"
//! type = "integer"
//! min = 1
//! max = 65535
//! required = true
//!
//! [[modules.network.options]]
//! name = "tls.key"
//!
//! [[modules.network.options]]
//! name = "tls.cert"
//! depends_on = "tls.key"
//! ```

use std::{collections::BTreeMap, path::Path};

use {
    serde::Deserialize,
    tracing::debug,
};

use crate::{
    decorator::OptionExt,
    dependent::Dependency,
    error::{Error, Result},
    leaf::{BooleanOption, IntegerOption, OptionValue, StringOption, ValueOption},
    loader::{Format, read_file},
    option::ConfigOption,
    set::OptionSet,
};

/// Leaf type of an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    #[default]
    String,
    Integer,
    Boolean,
}

/// A default as written in the schema file, before conversion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDefault {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl RawDefault {
    fn as_raw(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One declared option.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub required: bool,
    /// Name of an option declared earlier in the same module.
    pub depends_on: Option<String>,
    pub default: Option<RawDefault>,
    /// Integer options only.
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// String options only.
    pub one_of: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModuleSchema {
    pub options: Vec<OptionSpec>,
}

/// Schemas of every known module, keyed by scope name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub modules: BTreeMap<String, ModuleSchema>,
}

impl Schema {
    /// Load a schema file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_file(path)?;
        let schema = Self::parse(&raw, Format::from_path(path)?)?;
        debug!(path = %path.display(), modules = schema.modules.len(), "loaded schema");
        Ok(schema)
    }

    pub fn parse(raw: &str, format: Format) -> Result<Self> {
        match format {
            Format::Toml => Ok(toml::from_str(raw)?),
            Format::Yaml => Ok(serde_yaml::from_str(raw)?),
            Format::Json => Ok(serde_json::from_str(raw)?),
        }
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

impl ModuleSchema {
    /// Build the option chains of `module` into a fresh registry.
    ///
    /// Chains are assembled leaf → value check → required → depends_on, so
    /// the dependency is the outermost layer and is checked first.
    pub fn build(&self, module: &str) -> Result<OptionSet> {
        let mut set = OptionSet::new();
        for spec in &self.options {
            if spec.name.is_empty() {
                return Err(Error::schema(module, "option with an empty name"));
            }
            let dependency = match &spec.depends_on {
                Some(target) => Some(set.dependency(target).ok_or_else(|| {
                    Error::schema(
                        module,
                        format!(
                            "option {} depends on {target}, which is not declared before it",
                            spec.name
                        ),
                    )
                })?),
                None => None,
            };
            build_option(module, spec, dependency, &mut set)?;
        }
        Ok(set)
    }
}

fn build_option(
    module: &str,
    spec: &OptionSpec,
    dependency: Option<Dependency>,
    set: &mut OptionSet,
) -> Result<()> {
    let has_range = spec.min.is_some() || spec.max.is_some();
    match spec.kind {
        OptionKind::String => {
            if has_range {
                return Err(misplaced(module, spec, "min/max", "integer"));
            }
            let leaf = with_default::<String>(module, spec, StringOption::new(&spec.name))?;
            if spec.one_of.is_empty() {
                register(module, set, leaf, spec.required, dependency)
            } else {
                let leaf = leaf.one_of(spec.one_of.iter().cloned());
                register(module, set, leaf, spec.required, dependency)
            }
        },
        OptionKind::Integer => {
            if !spec.one_of.is_empty() {
                return Err(misplaced(module, spec, "one_of", "string"));
            }
            let leaf = with_default::<i64>(module, spec, IntegerOption::new(&spec.name))?;
            if has_range {
                let min = spec.min.unwrap_or(i64::MIN);
                let max = spec.max.unwrap_or(i64::MAX);
                if min > max {
                    return Err(Error::schema(
                        module,
                        format!("option {} has min {min} above max {max}", spec.name),
                    ));
                }
                register(module, set, leaf.in_range(min, max), spec.required, dependency)
            } else {
                register(module, set, leaf, spec.required, dependency)
            }
        },
        OptionKind::Boolean => {
            if has_range {
                return Err(misplaced(module, spec, "min/max", "integer"));
            }
            if !spec.one_of.is_empty() {
                return Err(misplaced(module, spec, "one_of", "string"));
            }
            let leaf = with_default::<bool>(module, spec, BooleanOption::new(&spec.name))?;
            register(module, set, leaf, spec.required, dependency)
        },
    }
}

fn with_default<T: OptionValue>(
    module: &str,
    spec: &OptionSpec,
    leaf: ValueOption<T>,
) -> Result<ValueOption<T>> {
    let Some(raw) = &spec.default else {
        return Ok(leaf);
    };
    let value = T::parse(&raw.as_raw()).map_err(|reason| {
        Error::schema(
            module,
            format!("default of option {} is invalid: {reason}", spec.name),
        )
    })?;
    Ok(leaf.with_default(value))
}

fn register<O: ConfigOption + 'static>(
    module: &str,
    set: &mut OptionSet,
    option: O,
    required: bool,
    dependency: Option<Dependency>,
) -> Result<()> {
    let registered = match (required, dependency) {
        (false, None) => set.register(option).map(drop),
        (true, None) => set.register(option.required()).map(drop),
        (false, Some(dependency)) => set.register(option.depends_on(dependency)).map(drop),
        (true, Some(dependency)) => set
            .register(option.required().depends_on(dependency))
            .map(drop),
    };
    registered.map_err(|err| Error::schema(module, err.to_string()))
}

fn misplaced(module: &str, spec: &OptionSpec, field: &str, kind: &str) -> Error {
    Error::schema(
        module,
        format!(
            "option {}: {field} only applies to {kind} options",
            spec.name
        ),
    )
}

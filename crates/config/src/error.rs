use std::path::PathBuf;

use thiserror::Error;

/// Why a single option failed to validate.
///
/// The messages are user-facing: the owning module reports them verbatim as
/// configuration errors, so each one names the offending option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("option {name} is required")]
    MissingRequiredOption { name: String },

    #[error("option {dependency} is a dependency of {dependent}")]
    MissingDependency {
        dependency: String,
        dependent: String,
    },

    #[error("option {name} has an invalid value: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("option {name} has not been validated")]
    NotValidated { name: String },

    #[error("option {name} has no value")]
    Unset { name: String },

    #[error("option {name} is part of a dependency cycle")]
    DependencyCycle { name: String },

    #[error("option {name} is declared more than once")]
    DuplicateOption { name: String },
}

impl OptionError {
    #[must_use]
    pub fn missing_required(name: impl Into<String>) -> Self {
        Self::MissingRequiredOption { name: name.into() }
    }

    #[must_use]
    pub fn missing_dependency(dependency: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self::MissingDependency {
            dependency: dependency.into(),
            dependent: dependent.into(),
        }
    }

    #[must_use]
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of validating one option.
pub type OptionResult<T = ()> = std::result::Result<T, OptionError>;

/// Errors raised by the file-facing layers: loader, schema and diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("unsupported value at {path}: only scalars and tables are allowed")]
    UnsupportedValue { path: String },

    #[error("invalid schema for module {module}: {reason}")]
    Schema { module: String, reason: String },

    #[error(transparent)]
    Option(#[from] OptionError),
}

impl Error {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn schema(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

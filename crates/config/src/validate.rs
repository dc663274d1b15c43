//! Whole-file validation against a schema.
//!
//! Builds every module's option chains, validates each scope of the config
//! file with collect-all semantics, and turns the outcome into diagnostics.
//! Undeclared modules and options are reported as warnings with a spelling
//! suggestion when one is close enough.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{context::OptionsContext, loader::load_contexts, schema::Schema};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "schema", "option", "unknown-module",
    /// "unknown-option", "missing-module"
    pub category: &'static str,
    /// `module` or `module.option`
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Edit distance between two strings, one row at a time.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Closest candidate within `max_distance` edits, ignoring exact matches.
fn suggest<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_distance: usize,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|c| (c, edit_distance(needle, c)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(c, _)| c)
}

fn unknown_message(kind: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("unknown {kind} (did you mean \"{s}\"?)"),
        None => format!("unknown {kind}"),
    }
}

/// Validate already-loaded scopes against `schema`.
#[must_use]
pub fn validate_contexts(
    schema: &Schema,
    contexts: &BTreeMap<String, OptionsContext>,
) -> ValidationResult {
    let mut diagnostics = Vec::new();
    let empty = OptionsContext::empty();

    for (module, module_schema) in &schema.modules {
        let set = match module_schema.build(module) {
            Ok(set) => set,
            Err(e) => {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "schema",
                    module.as_str(),
                    e.to_string(),
                ));
                continue;
            },
        };

        let ctx = match contexts.get(module) {
            Some(ctx) => ctx,
            None => {
                diagnostics.push(Diagnostic::new(
                    Severity::Info,
                    "missing-module",
                    module.as_str(),
                    "module not configured; checking defaults",
                ));
                &empty
            },
        };

        let report = set.validate_all(ctx);
        for (name, err) in report.failures() {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "option",
                format!("{module}.{name}"),
                err.to_string(),
            ));
        }

        for raw in ctx.names() {
            if !set.contains(raw) {
                diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    "unknown-option",
                    format!("{module}.{raw}"),
                    unknown_message("option", suggest(raw, set.names(), 3)),
                ));
            }
        }
    }

    for scope in contexts.keys() {
        if !schema.modules.contains_key(scope) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "unknown-module",
                scope.as_str(),
                unknown_message("module", suggest(scope, schema.module_names(), 3)),
            ));
        }
    }

    debug!(
        modules = schema.modules.len(),
        diagnostics = diagnostics.len(),
        "validated configuration"
    );
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Load the config file at `path` and validate it against `schema`.
#[must_use]
pub fn validate_file(schema: &Schema, path: &Path) -> ValidationResult {
    let mut result = match load_contexts(path) {
        Ok(contexts) => validate_contexts(schema, &contexts),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to load config file: {e}"),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(path.to_path_buf());
    result
}

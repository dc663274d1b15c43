//! Validation of module options at configuration-load time.
//!
//! Every option implements [`Validate`]: it is initialized against the
//! [`OptionsContext`] of its module scope and ends up either valid (with a
//! typed value) or invalid (with an [`OptionError`]). Constraints are layered
//! on by wrapping an option in an [`OptionDecorator`]:
//!
//! ```
//! use modopts_config::{OptionExt, OptionsContext, StringOption, Validate};
//!
//! let mut host = StringOption::new("host").required();
//! let ctx: OptionsContext = [("host", "collector.local")].into_iter().collect();
//! host.initialize(&ctx).unwrap();
//! assert!(host.has_value());
//! ```
//!
//! Config files (`.toml`, `.yaml`/`.yml` or `.json`) are split into one
//! scope per top-level table by [`loader`] and checked against a declarative
//! [`Schema`] by [`validate`]. `${ENV_VAR}` placeholders in string values are
//! expanded on load.

pub mod checks;
pub mod context;
pub mod decorator;
pub mod dependent;
pub mod env_subst;
pub mod error;
pub mod leaf;
pub mod loader;
pub mod option;
pub mod required;
pub mod schema;
pub mod set;
pub mod validate;

pub use {
    checks::{InRange, OneOf},
    context::{ContextId, OptionsContext},
    decorator::{Constraint, Forward, OptionDecorator, OptionExt},
    dependent::{Dependency, DependentOptionDecorator, DependsOn, SharedOption},
    error::{Error, OptionError, OptionResult, Result},
    leaf::{BooleanOption, IntegerOption, OptionValue, StringOption, ValueOption},
    loader::{Format, load_contexts, parse_contexts},
    option::{ConfigOption, OptionState, Status, Validate},
    required::{Required, RequiredOptionDecorator},
    schema::{ModuleSchema, OptionKind, OptionSpec, Schema},
    set::{OptionHandle, OptionSet, ValidationReport},
    validate::{Diagnostic, Severity, ValidationResult, validate_contexts, validate_file},
};

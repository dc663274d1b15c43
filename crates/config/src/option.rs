//! The option capability shared by leaves and decorators.

use crate::{
    context::{ContextId, OptionsContext},
    error::{OptionError, OptionResult},
};

/// Where an option sits in its `Unvalidated → Valid | Invalid` lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Unvalidated,
    Valid,
    Invalid(OptionError),
}

/// Last validation outcome plus the context it was computed against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionState {
    context: Option<ContextId>,
    status: Status,
}

impl OptionState {
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    #[must_use]
    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }

    #[must_use]
    pub fn error(&self) -> Option<&OptionError> {
        match &self.status {
            Status::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this outcome was computed against `ctx`.
    #[must_use]
    pub fn is_current(&self, ctx: &OptionsContext) -> bool {
        self.context == Some(ctx.id())
    }

    pub(crate) fn record(&mut self, ctx: &OptionsContext, outcome: &OptionResult) {
        self.context = Some(ctx.id());
        self.status = match outcome {
            Ok(()) => Status::Valid,
            Err(err) => Status::Invalid(err.clone()),
        };
    }
}

/// Type-erased half of the option capability.
///
/// Registries and dependency links only need to drive validation and ask
/// whether a value came out of it, so this trait stays object safe.
pub trait Validate {
    /// Stable identifier used in error messages and dependency lookups.
    fn name(&self) -> &str;

    /// Validate against `ctx` and record the outcome.
    ///
    /// Running it again with the same context must give the same outcome.
    fn initialize(&mut self, ctx: &OptionsContext) -> OptionResult;

    fn state(&self) -> &OptionState;

    /// `true` once validated successfully with a usable value.
    fn has_value(&self) -> bool;
}

/// An option producing a typed value.
pub trait ConfigOption: Validate {
    type Value;

    /// The validated value; `None` before a successful `initialize`, after a
    /// failed one, or when an optional setting was absent.
    fn value(&self) -> Option<&Self::Value>;

    /// Like [`value`](Self::value) but explains why there is nothing to read.
    fn try_value(&self) -> OptionResult<&Self::Value> {
        match self.state().status() {
            Status::Unvalidated => Err(OptionError::NotValidated {
                name: self.name().to_string(),
            }),
            Status::Invalid(err) => Err(err.clone()),
            Status::Valid => self.value().ok_or_else(|| OptionError::Unset {
                name: self.name().to_string(),
            }),
        }
    }
}

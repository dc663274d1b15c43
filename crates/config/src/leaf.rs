//! Leaf options: read one raw value from the context and convert it.
//!
//! A leaf tolerates absence. Whether a missing setting is fatal is policy,
//! added by wrapping the leaf in a [`crate::RequiredOptionDecorator`].

use tracing::debug;

use crate::{
    context::OptionsContext,
    error::{OptionError, OptionResult},
    option::{ConfigOption, OptionState, Validate},
};

/// Conversion from a raw configuration string into a typed value.
pub trait OptionValue: Sized {
    /// Parse `raw`, returning a human-readable reason on failure.
    fn parse(raw: &str) -> Result<Self, String>;
}

impl OptionValue for String {
    fn parse(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl OptionValue for i64 {
    fn parse(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|e| format!("expected an integer, got {raw:?} ({e})"))
    }
}

impl OptionValue for bool {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("expected a boolean, got {raw:?}")),
        }
    }
}

/// A named leaf option holding a `T` once validated.
#[derive(Debug, Clone)]
pub struct ValueOption<T> {
    name: String,
    default: Option<T>,
    value: Option<T>,
    state: OptionState,
}

pub type StringOption = ValueOption<String>;
pub type IntegerOption = ValueOption<i64>;
pub type BooleanOption = ValueOption<bool>;

impl<T> ValueOption<T> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            value: None,
            state: OptionState::default(),
        }
    }

    /// Value used when the context does not mention this option.
    #[must_use]
    pub fn with_default(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }
}

impl<T: OptionValue + Clone> Validate for ValueOption<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &OptionsContext) -> OptionResult {
        let outcome = match ctx.get(&self.name) {
            Some(raw) => match T::parse(raw) {
                Ok(value) => {
                    self.value = Some(value);
                    Ok(())
                },
                Err(reason) => {
                    self.value = None;
                    Err(OptionError::invalid_value(&self.name, reason))
                },
            },
            None => {
                self.value = self.default.clone();
                Ok(())
            },
        };
        debug!(
            option = %self.name,
            context = %ctx.id(),
            present = ctx.contains(&self.name),
            ok = outcome.is_ok(),
            "initialized leaf option"
        );
        self.state.record(ctx, &outcome);
        outcome
    }

    fn state(&self) -> &OptionState {
        &self.state
    }

    fn has_value(&self) -> bool {
        self.state.is_valid() && self.value.is_some()
    }
}

impl<T: OptionValue + Clone> ConfigOption for ValueOption<T> {
    type Value = T;

    fn value(&self) -> Option<&T> {
        if self.state.is_valid() {
            self.value.as_ref()
        } else {
            None
        }
    }
}

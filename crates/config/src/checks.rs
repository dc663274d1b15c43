//! Value checks layered on leaves that convert their raw input.

use crate::{
    context::OptionsContext,
    decorator::Constraint,
    error::{OptionError, OptionResult},
    option::ConfigOption,
};

/// Inclusive bounds for an integer option. Absent values are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InRange {
    min: i64,
    max: i64,
}

impl InRange {
    #[must_use]
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl<O: ConfigOption<Value = i64>> Constraint<O> for InRange {
    fn apply(&mut self, inner: &mut O, ctx: &OptionsContext) -> OptionResult {
        inner.initialize(ctx)?;
        match inner.value() {
            Some(&value) if value < self.min || value > self.max => {
                Err(OptionError::invalid_value(
                    inner.name(),
                    format!("{value} is outside {}..={}", self.min, self.max),
                ))
            },
            _ => Ok(()),
        }
    }
}

/// Restricts a string option to a fixed set of spellings (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOf {
    allowed: Vec<String>,
}

impl OneOf {
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl<O: ConfigOption<Value = String>> Constraint<O> for OneOf {
    fn apply(&mut self, inner: &mut O, ctx: &OptionsContext) -> OptionResult {
        inner.initialize(ctx)?;
        let Some(value) = inner.value() else {
            return Ok(());
        };
        if self.allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
            Ok(())
        } else {
            Err(OptionError::invalid_value(
                inner.name(),
                format!("{value:?} is not one of: {}", self.allowed.join(", ")),
            ))
        }
    }
}

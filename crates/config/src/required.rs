use crate::{
    context::OptionsContext,
    decorator::{Constraint, OptionDecorator},
    error::{OptionError, OptionResult},
    option::ConfigOption,
};

/// Turns "absent" from tolerated into fatal.
///
/// A leaf reports success even when its setting is missing, so the check
/// looks at whether a value came out, not only at the inner result.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl<O: ConfigOption> Constraint<O> for Required {
    fn apply(&mut self, inner: &mut O, ctx: &OptionsContext) -> OptionResult {
        inner.initialize(ctx)?;
        if inner.has_value() {
            Ok(())
        } else {
            Err(OptionError::missing_required(inner.name()))
        }
    }
}

pub type RequiredOptionDecorator<O> = OptionDecorator<O, Required>;

impl<O> RequiredOptionDecorator<O> {
    #[must_use]
    pub fn new(inner: O) -> Self {
        Self::wrap(inner, Required)
    }
}

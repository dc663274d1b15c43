//! Decorator base: wrap one option and layer a constraint on top of it.
//!
//! `OptionDecorator` owns the inner option, forwards `name`/`value`, and
//! records its own outcome. Concrete decorators only provide a
//! [`Constraint`], overriding the one step they change.

use crate::{
    checks::{InRange, OneOf},
    context::OptionsContext,
    dependent::{Dependency, DependsOn},
    error::OptionResult,
    option::{ConfigOption, OptionState, Validate},
    required::Required,
};

/// Validation policy applied around an inner option.
///
/// The default forwards `initialize` unchanged.
pub trait Constraint<O: ConfigOption> {
    fn apply(&mut self, inner: &mut O, ctx: &OptionsContext) -> OptionResult {
        inner.initialize(ctx)
    }
}

/// Constraint that adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

impl<O: ConfigOption> Constraint<O> for Forward {}

/// An option wrapped by constraint `C`.
#[derive(Debug, Clone)]
pub struct OptionDecorator<O, C> {
    inner: O,
    constraint: C,
    state: OptionState,
}

impl<O, C> OptionDecorator<O, C> {
    #[must_use]
    pub fn wrap(inner: O, constraint: C) -> Self {
        Self {
            inner,
            constraint,
            state: OptionState::default(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &O {
        &self.inner
    }

    #[must_use]
    pub fn constraint(&self) -> &C {
        &self.constraint
    }

    #[must_use]
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O> OptionDecorator<O, Forward> {
    /// Wrap `inner` without adding any constraint.
    #[must_use]
    pub fn forward(inner: O) -> Self {
        Self::wrap(inner, Forward)
    }
}

impl<O: ConfigOption, C: Constraint<O>> Validate for OptionDecorator<O, C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(&mut self, ctx: &OptionsContext) -> OptionResult {
        let outcome = self.constraint.apply(&mut self.inner, ctx);
        self.state.record(ctx, &outcome);
        outcome
    }

    fn state(&self) -> &OptionState {
        &self.state
    }

    fn has_value(&self) -> bool {
        self.state.is_valid() && self.inner.has_value()
    }
}

impl<O: ConfigOption, C: Constraint<O>> ConfigOption for OptionDecorator<O, C> {
    type Value = O::Value;

    fn value(&self) -> Option<&O::Value> {
        // The inner option may have succeeded while this layer rejected it.
        if self.state.is_valid() {
            self.inner.value()
        } else {
            None
        }
    }
}

/// Builder-style chaining of decorators onto any option.
///
/// ```
/// use modopts_config::{OptionExt, OptionsContext, StringOption, Validate};
///
/// let mut host = StringOption::new("host").required();
/// let ctx: OptionsContext = [("host", "localhost")].into_iter().collect();
/// assert!(host.initialize(&ctx).is_ok());
/// ```
pub trait OptionExt: ConfigOption + Sized {
    fn decorate<C: Constraint<Self>>(self, constraint: C) -> OptionDecorator<Self, C> {
        OptionDecorator::wrap(self, constraint)
    }

    fn required(self) -> OptionDecorator<Self, Required> {
        OptionDecorator::wrap(self, Required)
    }

    fn depends_on(self, dependency: Dependency) -> OptionDecorator<Self, DependsOn> {
        OptionDecorator::wrap(self, DependsOn::new(dependency))
    }

    fn in_range(self, min: i64, max: i64) -> OptionDecorator<Self, InRange>
    where
        Self: ConfigOption<Value = i64>,
    {
        OptionDecorator::wrap(self, InRange::new(min, max))
    }

    fn one_of<I, S>(self, allowed: I) -> OptionDecorator<Self, OneOf>
    where
        Self: ConfigOption<Value = String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionDecorator::wrap(self, OneOf::new(allowed))
    }
}

impl<O: ConfigOption> OptionExt for O {}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::OptionError, leaf::StringOption},
    };

    /// Rejects values longer than a limit, to exercise a custom constraint.
    struct MaxLen(usize);

    impl<O: ConfigOption<Value = String>> Constraint<O> for MaxLen {
        fn apply(&mut self, inner: &mut O, ctx: &OptionsContext) -> OptionResult {
            inner.initialize(ctx)?;
            match inner.value() {
                Some(v) if v.len() > self.0 => {
                    Err(OptionError::invalid_value(inner.name(), "too long"))
                },
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn forwarding_decorator_behaves_like_inner() {
        let ctx: OptionsContext = [("host", "localhost")].into_iter().collect();
        let mut opt = OptionDecorator::forward(StringOption::new("host"));
        opt.initialize(&ctx).unwrap();
        assert_eq!(opt.name(), "host");
        assert_eq!(opt.value().map(String::as_str), Some("localhost"));
        assert!(opt.has_value());
        assert!(opt.state().is_current(&ctx));
    }

    #[test]
    fn forwarding_decorator_propagates_inner_error() {
        let ctx: OptionsContext = [("port", "abc")].into_iter().collect();
        let mut opt = crate::leaf::IntegerOption::new("port").decorate(Forward);
        assert!(matches!(
            opt.initialize(&ctx),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn custom_constraint_hides_rejected_value() {
        let ctx: OptionsContext = [("tag", "abcdef")].into_iter().collect();
        let mut opt = StringOption::new("tag").decorate(MaxLen(3));
        assert!(opt.initialize(&ctx).is_err());
        // The leaf itself accepted the raw value.
        assert!(opt.inner().has_value());
        assert_eq!(opt.value(), None);
        assert!(!opt.has_value());
    }

    #[test]
    fn decorators_keep_the_inner_name() {
        let opt = StringOption::new("tag").decorate(MaxLen(3)).required();
        assert_eq!(opt.name(), "tag");
        assert_eq!(opt.into_inner().into_inner().name(), "tag");
    }
}

//! Cross-option dependencies.
//!
//! A dependent option only validates once its dependency has validated with
//! a value against the same context. The dependency is not owned: it lives in
//! the owner's [`crate::OptionSet`] (or any other `Rc` the caller keeps) and
//! is reached through a [`Weak`] link.
//!
//! If the dependency has no outcome for the current context yet, the
//! dependent initializes it itself. Callers therefore do not have to order
//! their options by dependency.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use tracing::{debug, warn};

use crate::{
    context::OptionsContext,
    decorator::{Constraint, OptionDecorator},
    error::{OptionError, OptionResult},
    option::{ConfigOption, Validate},
};

/// Shared handle to an option, as stored by an owner.
pub type SharedOption = Rc<RefCell<dyn Validate>>;

/// Non-owning link to the option another one depends on.
#[derive(Clone)]
pub struct Dependency {
    name: String,
    handle: Weak<RefCell<dyn Validate>>,
}

impl Dependency {
    /// Link to an option the caller keeps alive.
    #[must_use]
    pub fn on<O: Validate + 'static>(option: &Rc<RefCell<O>>) -> Self {
        let shared: SharedOption = option.clone();
        Self::from_shared(&shared)
    }

    #[must_use]
    pub fn from_shared(option: &SharedOption) -> Self {
        Self {
            name: option.borrow().name().to_string(),
            handle: Rc::downgrade(option),
        }
    }

    /// Link through an existing weak handle, e.g. one obtained from
    /// [`Rc::new_cyclic`] while the target is still being built.
    #[must_use]
    pub fn from_weak(name: impl Into<String>, handle: Weak<RefCell<dyn Validate>>) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make sure the dependency has an outcome for `ctx` and report whether it
    /// produced a value.
    fn resolve(&self, ctx: &OptionsContext) -> OptionResult<bool> {
        let Some(handle) = self.handle.upgrade() else {
            debug!(dependency = %self.name, "dependency no longer exists");
            return Ok(false);
        };
        // An outcome for this context only needs a shared borrow.
        if let Ok(dependency) = handle.try_borrow()
            && dependency.state().is_current(ctx)
        {
            return Self::outcome(&*dependency);
        }
        // Already borrowed mutably means we are inside its own initialize.
        let Ok(mut dependency) = handle.try_borrow_mut() else {
            return Err(OptionError::DependencyCycle {
                name: self.name.clone(),
            });
        };
        if let Err(err) = dependency.initialize(ctx) {
            debug!(dependency = %self.name, error = %err, "dependency failed to initialize");
        }
        Self::outcome(&*dependency)
    }

    fn outcome(dependency: &dyn Validate) -> OptionResult<bool> {
        if let Some(err @ OptionError::DependencyCycle { .. }) = dependency.state().error() {
            return Err(err.clone());
        }
        Ok(dependency.has_value())
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("alive", &(self.handle.strong_count() > 0))
            .finish()
    }
}

/// Requires a dependency to validate before the wrapped option may.
#[derive(Debug, Clone)]
pub struct DependsOn {
    dependency: Dependency,
}

impl DependsOn {
    #[must_use]
    pub fn new(dependency: Dependency) -> Self {
        Self { dependency }
    }

    #[must_use]
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }
}

impl<O: ConfigOption> Constraint<O> for DependsOn {
    fn apply(&mut self, inner: &mut O, ctx: &OptionsContext) -> OptionResult {
        // Checked first so an unmet dependency wins over the inner's own errors.
        if !self.dependency.resolve(ctx)? {
            warn!(
                option = inner.name(),
                dependency = self.dependency.name(),
                "dependency is not satisfied"
            );
            return Err(OptionError::missing_dependency(
                self.dependency.name(),
                inner.name(),
            ));
        }
        inner.initialize(ctx)
    }
}

pub type DependentOptionDecorator<O> = OptionDecorator<O, DependsOn>;

impl<O> DependentOptionDecorator<O> {
    #[must_use]
    pub fn new(inner: O, dependency: Dependency) -> Self {
        Self::wrap(inner, DependsOn::new(dependency))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            decorator::OptionExt,
            leaf::StringOption,
            option::Status,
            required::RequiredOptionDecorator,
        },
    };

    fn shared(name: &str) -> Rc<RefCell<StringOption>> {
        Rc::new(RefCell::new(StringOption::new(name)))
    }

    #[test]
    fn initializes_dependency_on_demand() {
        let dependency = shared("string_dependency");
        let mut dependent =
            DependentOptionDecorator::new(StringOption::new("dependent"), Dependency::on(&dependency));
        let ctx: OptionsContext = [("string_dependency", "x"), ("dependent", "y")]
            .into_iter()
            .collect();

        dependent.initialize(&ctx).unwrap();
        assert!(dependency.borrow().state().is_current(&ctx));
        assert_eq!(dependency.borrow().value().map(String::as_str), Some("x"));
    }

    #[test]
    fn reuses_dependency_outcome_for_same_context() {
        let dependency = shared("dep");
        let ctx: OptionsContext = [("dep", "x")].into_iter().collect();
        dependency.borrow_mut().initialize(&ctx).unwrap();
        let before = dependency.borrow().state().clone();

        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));
        dependent.initialize(&ctx).unwrap();
        assert_eq!(dependency.borrow().state(), &before);
    }

    #[test]
    fn revalidates_dependency_for_new_context() {
        let dependency = shared("dep");
        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));

        let with: OptionsContext = [("dep", "x"), ("opt", "y")].into_iter().collect();
        dependent.initialize(&with).unwrap();

        let without: OptionsContext = [("opt", "y")].into_iter().collect();
        let err = dependent.initialize(&without).unwrap_err();
        assert_eq!(err, OptionError::missing_dependency("dep", "opt"));
        // Stale value from the first pass must not leak out.
        assert_eq!(dependent.value(), None);
    }

    #[test]
    fn inner_is_not_initialized_when_dependency_fails() {
        let dependency = shared("dep");
        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));
        let ctx: OptionsContext = [("opt", "y")].into_iter().collect();

        assert!(dependent.initialize(&ctx).is_err());
        assert_eq!(dependent.inner().state().status(), &Status::Unvalidated);
    }

    #[test]
    fn failing_required_dependency_blocks_dependent() {
        let dependency = Rc::new(RefCell::new(RequiredOptionDecorator::new(
            StringOption::new("dep"),
        )));
        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));
        let ctx: OptionsContext = [("opt", "y")].into_iter().collect();

        assert_eq!(
            dependent.initialize(&ctx),
            Err(OptionError::missing_dependency("dep", "opt"))
        );
        assert_eq!(
            dependency.borrow().state().error(),
            Some(&OptionError::missing_required("dep"))
        );
    }

    #[test]
    fn dropped_dependency_counts_as_missing() {
        let dependency = shared("dep");
        let link = Dependency::on(&dependency);
        drop(dependency);

        let mut dependent = StringOption::new("opt").depends_on(link);
        let ctx: OptionsContext = [("dep", "x"), ("opt", "y")].into_iter().collect();
        assert_eq!(
            dependent.initialize(&ctx),
            Err(OptionError::missing_dependency("dep", "opt"))
        );
    }

    #[test]
    fn dependency_borrowed_elsewhere_is_reported_as_cycle() {
        let dependency = shared("dep");
        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));
        let ctx: OptionsContext = [("dep", "x"), ("opt", "y")].into_iter().collect();

        let guard = dependency.borrow_mut();
        assert_eq!(
            dependent.initialize(&ctx),
            Err(OptionError::DependencyCycle { name: "dep".into() })
        );
        drop(guard);
        assert!(dependent.initialize(&ctx).is_ok());
    }

    #[test]
    fn current_dependency_can_be_read_while_dependent_validates() {
        let dependency = shared("dep");
        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));
        let ctx: OptionsContext = [("dep", "x"), ("opt", "y")].into_iter().collect();
        dependency.borrow_mut().initialize(&ctx).unwrap();

        let reader = dependency.borrow();
        dependent.initialize(&ctx).unwrap();
        assert_eq!(reader.value().map(String::as_str), Some("x"));
        assert_eq!(dependent.value().map(String::as_str), Some("y"));
    }

    #[test]
    fn stale_dependency_under_a_read_borrow_is_a_cycle() {
        let dependency = shared("dep");
        let mut dependent = StringOption::new("opt").depends_on(Dependency::on(&dependency));
        let ctx: OptionsContext = [("dep", "x"), ("opt", "y")].into_iter().collect();

        let reader = dependency.borrow();
        assert_eq!(
            dependent.initialize(&ctx),
            Err(OptionError::DependencyCycle { name: "dep".into() })
        );
        drop(reader);
    }

    #[test]
    fn mutual_dependency_is_reported_as_cycle() {
        type Dependent = DependentOptionDecorator<StringOption>;

        let mut b_slot: Option<Rc<RefCell<Dependent>>> = None;
        let a: Rc<RefCell<Dependent>> = Rc::new_cyclic(|weak_a: &Weak<RefCell<Dependent>>| {
            let to_a: Weak<RefCell<dyn Validate>> = weak_a.clone();
            let b = Rc::new(RefCell::new(
                StringOption::new("b").depends_on(Dependency::from_weak("a", to_a)),
            ));
            let link = Dependency::on(&b);
            b_slot = Some(b);
            RefCell::new(StringOption::new("a").depends_on(link))
        });
        let b = b_slot.unwrap();
        let ctx: OptionsContext = [("a", "1"), ("b", "2")].into_iter().collect();

        let cycle = OptionError::DependencyCycle { name: "a".into() };
        assert_eq!(a.borrow_mut().initialize(&ctx), Err(cycle.clone()));
        assert_eq!(b.borrow().state().error(), Some(&cycle));
    }

    #[test]
    fn debug_shows_liveness() {
        let dependency = shared("dep");
        let link = Dependency::on(&dependency);
        assert!(format!("{link:?}").contains("alive: true"));
        drop(dependency);
        assert!(format!("{link:?}").contains("alive: false"));
    }
}

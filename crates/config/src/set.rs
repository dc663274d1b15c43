//! Registry of the options one module declares.

use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use crate::{
    context::OptionsContext,
    dependent::{Dependency, SharedOption},
    error::{OptionError, OptionResult},
    option::Validate,
};

/// Typed handle returned on registration; the owner reads values through it.
pub type OptionHandle<O> = Rc<RefCell<O>>;

struct Entry {
    name: String,
    option: SharedOption,
}

/// The options of one module, in registration order.
///
/// The set owns every registered option. Dependency links handed out by
/// [`OptionSet::dependency`] are weak, so they never keep an option alive on
/// their own.
#[derive(Default)]
pub struct OptionSet {
    entries: Vec<Entry>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `option`, rejecting a second option with the same name.
    pub fn register<O: Validate + 'static>(&mut self, option: O) -> OptionResult<OptionHandle<O>> {
        let name = option.name().to_string();
        if self.contains(&name) {
            return Err(OptionError::DuplicateOption { name });
        }
        let handle = Rc::new(RefCell::new(option));
        let shared: SharedOption = handle.clone();
        self.entries.push(Entry {
            name,
            option: shared,
        });
        Ok(handle)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<SharedOption> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Rc::clone(&e.option))
    }

    /// Weak link to a registered option, for use with `depends_on`.
    #[must_use]
    pub fn dependency(&self, name: &str) -> Option<Dependency> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Dependency::from_weak(e.name.clone(), Rc::downgrade(&e.option)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every option, stopping at the first failure.
    pub fn validate(&self, ctx: &OptionsContext) -> OptionResult {
        for entry in &self.entries {
            entry.option.borrow_mut().initialize(ctx)?;
        }
        Ok(())
    }

    /// Validate every option and collect all failures.
    #[must_use]
    pub fn validate_all(&self, ctx: &OptionsContext) -> ValidationReport {
        let mut failures = Vec::new();
        for entry in &self.entries {
            if let Err(err) = entry.option.borrow_mut().initialize(ctx) {
                failures.push((entry.name.clone(), err));
            }
        }
        debug!(
            context = %ctx.id(),
            options = self.entries.len(),
            failures = failures.len(),
            "validated option set"
        );
        ValidationReport {
            checked: self.entries.len(),
            failures,
        }
    }
}

impl std::fmt::Debug for OptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Outcome of [`OptionSet::validate_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    checked: usize,
    failures: Vec<(String, OptionError)>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of options that were validated.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// `(option name, error)` pairs in registration order.
    #[must_use]
    pub fn failures(&self) -> &[(String, OptionError)] {
        &self.failures
    }

    pub fn errors(&self) -> impl Iterator<Item = &OptionError> {
        self.failures.iter().map(|(_, err)| err)
    }

    /// Collapse into a result carrying every error.
    pub fn into_result(self) -> Result<(), Vec<OptionError>> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self.failures.into_iter().map(|(_, err)| err).collect())
        }
    }
}

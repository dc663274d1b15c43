//! Raw option values for one configuration scope.

use std::{
    collections::BTreeMap,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the context an option outcome was computed against.
///
/// Every context built from scratch gets a fresh id. Clones keep the id of
/// their source since their content is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Immutable name → raw string mapping handed to option validation.
///
/// Produced by whatever parses the configuration (see [`crate::loader`]);
/// options only ever read from it.
#[derive(Debug, Clone)]
pub struct OptionsContext {
    id: ContextId,
    values: BTreeMap<String, String>,
}

impl OptionsContext {
    #[must_use]
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self {
            id: ContextId::next(),
            values,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Raw value for `name`, if the configuration set one.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Option names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for OptionsContext {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OptionsContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let ctx: OptionsContext = [("host", "localhost"), ("port", "514")]
            .into_iter()
            .collect();
        assert_eq!(ctx.get("host"), Some("localhost"));
        assert_eq!(ctx.get("missing"), None);
        assert!(ctx.contains("port"));
        assert_eq!(ctx.names().collect::<Vec<_>>(), vec!["host", "port"]);
    }

    #[test]
    fn fresh_contexts_get_distinct_ids() {
        let a = OptionsContext::empty();
        let b = OptionsContext::empty();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clones_share_the_id() {
        let a: OptionsContext = [("host", "localhost")].into_iter().collect();
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert_eq!(b.get("host"), Some("localhost"));
    }
}

//! Collector scopes: named phases of a request and the extra collectors
//! that ride along with the scan of each phase.

use std::borrow::Cow;
use std::fmt;

use ahash::AHashMap;

use crate::search::collector::Collector;

/// Identifier of a processing phase.
///
/// Any string is a valid scope; three are reserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(Cow<'static, str>);

impl Scope {
    /// The primary query phase.
    pub const MAIN: Scope = Scope(Cow::Borrowed("_main_"));
    /// The phase that ignores per-document filters.
    pub const GLOBAL: Scope = Scope(Cow::Borrowed("_global_"));
    /// Nothing is being processed.
    pub const NA: Scope = Scope(Cow::Borrowed("_na_"));

    /// Create a scope from any name.
    pub fn new<S: Into<Cow<'static, str>>>(name: S) -> Self {
        Scope(name.into())
    }

    /// The scope name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Scope {
    fn from(name: &'static str) -> Self {
        Scope(Cow::Borrowed(name))
    }
}

impl From<String> for Scope {
    fn from(name: String) -> Self {
        Scope(Cow::Owned(name))
    }
}

/// Scope to ordered collectors. Unknown scopes have no collectors.
///
/// Pure bookkeeping: nothing here validates or fails.
#[derive(Debug, Default)]
pub struct CollectorScopes {
    scopes: AHashMap<Scope, Vec<Box<dyn Collector>>>,
}

impl CollectorScopes {
    /// Create an empty registry.
    pub fn new() -> Self {
        CollectorScopes::default()
    }

    /// Append a collector to a scope.
    pub fn add(&mut self, scope: Scope, collector: Box<dyn Collector>) {
        self.scopes.entry(scope).or_default().push(collector);
    }

    /// Collectors of a scope, in insertion order.
    pub fn get(&self, scope: &Scope) -> &[Box<dyn Collector>] {
        self.scopes.get(scope).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable collectors of a scope, in insertion order.
    pub fn get_mut(&mut self, scope: &Scope) -> &mut [Box<dyn Collector>] {
        self.scopes
            .get_mut(scope)
            .map(Vec::as_mut_slice)
            .unwrap_or(&mut [])
    }

    /// Whether a scope has at least one collector.
    pub fn has(&self, scope: &Scope) -> bool {
        !self.get(scope).is_empty()
    }

    /// Drop a scope's entry and hand back its collectors. Removing an
    /// unknown scope returns nothing.
    pub fn remove(&mut self, scope: &Scope) -> Vec<Box<dyn Collector>> {
        self.scopes.remove(scope).unwrap_or_default()
    }

    /// Scopes that currently have an entry.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.keys()
    }

    /// Number of scopes with an entry.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope has an entry.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::collector::{AllDocsCollector, CountCollector};

    #[test]
    fn test_reserved_scopes() {
        assert_eq!(Scope::MAIN.as_str(), "_main_");
        assert_eq!(Scope::GLOBAL.as_str(), "_global_");
        assert_eq!(Scope::NA.to_string(), "_na_");
        assert_eq!(Scope::from("_global_"), Scope::GLOBAL);
        assert_eq!(Scope::new(String::from("facet_1")), Scope::from("facet_1"));
    }

    #[test]
    fn test_add_preserves_order() {
        let mut scopes = CollectorScopes::new();
        scopes.add(Scope::GLOBAL, Box::new(CountCollector::new()));
        scopes.add(Scope::GLOBAL, Box::new(AllDocsCollector::new()));
        scopes.add(Scope::from("facet"), Box::new(CountCollector::new()));

        assert_eq!(scopes.len(), 2);
        let global = scopes.get(&Scope::GLOBAL);
        assert_eq!(global.len(), 2);
        assert!(format!("{:?}", global[0]).starts_with("CountCollector"));
        assert!(format!("{:?}", global[1]).starts_with("AllDocsCollector"));
    }

    #[test]
    fn test_unknown_scope_is_empty() {
        let mut scopes = CollectorScopes::new();
        assert!(!scopes.has(&Scope::MAIN));
        assert!(scopes.get(&Scope::MAIN).is_empty());
        assert!(scopes.get_mut(&Scope::MAIN).is_empty());
        assert!(scopes.remove(&Scope::MAIN).is_empty());
    }

    #[test]
    fn test_remove_is_one_shot() {
        let mut scopes = CollectorScopes::new();
        scopes.add(Scope::GLOBAL, Box::new(CountCollector::new()));
        assert!(scopes.has(&Scope::GLOBAL));

        assert_eq!(scopes.remove(&Scope::GLOBAL).len(), 1);
        assert!(!scopes.has(&Scope::GLOBAL));
        assert!(scopes.remove(&Scope::GLOBAL).is_empty());
        assert!(scopes.is_empty());
    }
}

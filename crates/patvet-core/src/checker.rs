//! Checkers and ordered checker sets.

use std::collections::BTreeMap;
use std::sync::Arc;

/// A named rule: compiled pattern plus the message reported for each match.
#[derive(Debug)]
pub struct Checker<P> {
    name: String,
    pattern: P,
    message: String,
}

impl<P> Checker<P> {
    /// Creates a checker from an already compiled pattern.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: P, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern,
            message: message.into(),
        }
    }

    /// Returns the unique checker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the compiled pattern handle.
    #[must_use]
    pub fn pattern(&self) -> &P {
        &self.pattern
    }

    /// Returns the message reported for every match.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A set of checkers keyed by name.
///
/// Iteration is lexicographic by name. That order decides which findings land
/// before the error budget runs out, so it must never depend on insertion order.
#[derive(Debug)]
pub struct CheckerSet<P> {
    checkers: BTreeMap<String, Arc<Checker<P>>>,
}

impl<P> Default for CheckerSet<P> {
    fn default() -> Self {
        Self {
            checkers: BTreeMap::new(),
        }
    }
}

impl<P> Clone for CheckerSet<P> {
    fn clone(&self) -> Self {
        Self {
            checkers: self.checkers.clone(),
        }
    }
}

impl<P> CheckerSet<P> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a checker, returning `false` if the name was already present.
    ///
    /// An existing entry is left in place.
    pub fn insert(&mut self, checker: Arc<Checker<P>>) -> bool {
        if self.checkers.contains_key(checker.name()) {
            return false;
        }
        self.checkers.insert(checker.name().to_string(), checker);
        true
    }

    /// Looks up a checker by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Checker<P>>> {
        self.checkers.get(name)
    }

    /// Returns `true` if a checker with `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.checkers.contains_key(name)
    }

    /// Number of checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Iterates checkers in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Checker<P>>> {
        self.checkers.values()
    }

    /// Iterates checker names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checkers.keys().map(String::as_str)
    }

    /// Returns a new set holding every checker whose name passes `keep`.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            checkers: self
                .checkers
                .iter()
                .filter(|(name, _)| keep(name))
                .map(|(name, checker)| (name.clone(), Arc::clone(checker)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(name: &str) -> Arc<Checker<()>> {
        Arc::new(Checker::new(name, (), format!("{name} message")))
    }

    #[test]
    fn iteration_is_lexicographic() {
        let mut set = CheckerSet::new();
        for name in ["zeta", "alpha", "mid"] {
            assert!(set.insert(checker(name)));
        }
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn duplicate_insert_keeps_first() {
        let mut set = CheckerSet::new();
        assert!(set.insert(Arc::new(Checker::new("r1", (), "first"))));
        assert!(!set.insert(Arc::new(Checker::new("r1", (), "second"))));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("r1").map(|c| c.message()), Some("first"));
    }

    #[test]
    fn filtered_shares_checkers() {
        let mut set = CheckerSet::new();
        set.insert(checker("a"));
        set.insert(checker("b"));
        let only_b = set.filtered(|name| name != "a");
        assert_eq!(only_b.names().collect::<Vec<_>>(), vec!["b"]);
        let original = set.get("b").map(Arc::as_ptr);
        assert_eq!(only_b.get("b").map(Arc::as_ptr), original);
    }
}

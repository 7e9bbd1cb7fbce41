//! Ordered replacement tables.
//!
//! A `RuleSet` is what a host collects while reading its configuration: one
//! pattern → replacement entry per declared rule, in declaration order. Rule
//! sets from nested scopes are merged with [`RuleSet::overlay`], and a rule
//! set turns into a compiled automaton with [`RuleSet::build`].

use indexmap::IndexMap;
use tracing::debug;

use crate::automaton::Automaton;
use crate::config::Config;
use crate::error::{AcError, Result};

/// Pattern → replacement rules in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: IndexMap<Vec<u8>, Vec<u8>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, returning the replacement it displaced.
    ///
    /// A repeated pattern keeps its original position.
    pub fn insert(
        &mut self,
        pattern: impl Into<Vec<u8>>,
        replacement: impl Into<Vec<u8>>,
    ) -> Result<Option<Vec<u8>>> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(AcError::EmptyPattern);
        }
        Ok(self.rules.insert(pattern, replacement.into()))
    }

    pub fn get(&self, pattern: &[u8]) -> Option<&[u8]> {
        self.rules.get(pattern).map(Vec::as_slice)
    }

    pub fn remove(&mut self, pattern: &[u8]) -> Option<Vec<u8>> {
        self.rules.shift_remove(pattern)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.rules
            .iter()
            .map(|(pattern, replacement)| (pattern.as_slice(), replacement.as_slice()))
    }

    /// Merge with the rules of an enclosing scope.
    ///
    /// The parent's rules come first; rules in `self` override parent rules
    /// with the same pattern.
    pub fn overlay(&self, parent: &RuleSet) -> RuleSet {
        let mut merged = parent.clone();
        for (pattern, replacement) in &self.rules {
            merged.rules.insert(pattern.clone(), replacement.clone());
        }
        merged
    }

    /// Compile the rules into an automaton that borrows their bytes.
    ///
    /// An empty rule set yields a compiled automaton that matches nothing.
    pub fn build(&self, config: Config) -> Result<Automaton<'_>> {
        if self.rules.is_empty() {
            return Ok(Automaton::empty(config));
        }

        let mut ac = Automaton::with_config(config);
        for (pattern, replacement) in &self.rules {
            ac.add_pattern(pattern, replacement)?;
        }
        ac.compile()?;

        debug!(rules = self.rules.len(), "built rule set");
        Ok(ac)
    }
}

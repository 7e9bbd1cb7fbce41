//! Aho-Corasick automaton over byte strings.
//!
//! The automaton is built in two phases. Patterns are first inserted into a
//! byte-indexed trie, then `compile` adds failure and output links in one
//! breadth-first pass. After that the automaton is read-only and can be
//! searched from any number of threads.
//!
//! # Module Organization
//!
//! - `arena`: node storage (`Node`, `NodeId`, `NodeArena`)
//! - `trie`: pattern insertion
//! - `compile`: failure/output link construction
//! - `search`: the matching scan (`Match`)

mod arena;
mod compile;
mod search;
mod trie;

pub use arena::{Node, NodeArena, NodeId};
pub use search::Match;

use crate::config::Config;

/// Read-only size figures for an automaton.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    /// Allocated nodes, root included
    pub node_count: usize,
    /// Terminal nodes, i.e. distinct patterns
    pub pattern_count: usize,
    /// Nodes the arena may hold before growing or failing
    pub node_capacity: usize,
    /// Estimated footprint in bytes
    pub memory_usage: usize,
}

/// A multi-pattern matcher with per-pattern replacements.
///
/// Pattern and replacement bytes are borrowed for `'a` when added with
/// [`add_pattern`](Self::add_pattern) and owned when added with
/// [`add_owned_pattern`](Self::add_owned_pattern). `U` is an opaque value
/// attached to each pattern and handed back to replacement callbacks.
///
/// ```
/// use acsub::Automaton;
///
/// let mut ac = Automaton::new();
/// ac.add_pattern(b"cat", b"dog").unwrap();
/// ac.compile().unwrap();
///
/// let out = ac.replace_all(b"the cat sat").unwrap();
/// assert_eq!(out.bytes, b"the dog sat");
/// ```
#[derive(Clone, Debug)]
pub struct Automaton<'a, U = ()> {
    arena: NodeArena<'a, U>,
    compiled: bool,
    config: Config,
}

impl<U> Default for Automaton<'_, U> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Automaton<'_, ()> {
    /// Create an automaton with the default node capacity.
    ///
    /// Automata carrying user data are created with
    /// [`with_config`](Self::with_config) or `Default`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an automaton holding at most `capacity` nodes (0 for the default).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(Config::new().node_capacity(capacity))
    }
}

impl<'a, U> Automaton<'a, U> {
    pub fn with_config(config: Config) -> Self {
        let config = config.node_capacity(config.node_capacity);
        Self {
            arena: NodeArena::new(config.node_capacity, config.growth),
            compiled: false,
            config,
        }
    }

    /// A root-only automaton that is already compiled and matches nothing.
    pub fn empty(config: Config) -> Self {
        let mut ac = Self::with_config(config);
        ac.compiled = true;
        ac
    }

    /// True once `compile` has succeeded and no pattern was added since.
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of distinct patterns.
    pub fn pattern_count(&self) -> usize {
        self.arena.iter().filter(|node| node.terminal).count()
    }

    /// Current node capacity.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Raise the node capacity by `additional` nodes.
    ///
    /// This is the only way a `GrowthPolicy::Fixed` automaton grows.
    pub fn reserve_nodes(&mut self, additional: usize) {
        self.arena.reserve(additional);
    }

    /// Look up a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node<'a, U>> {
        self.arena.get(id)
    }

    /// User data attached to the pattern ending at `id`.
    pub fn user_data(&self, id: NodeId) -> Option<&U> {
        self.arena.get(id).and_then(Node::user_data)
    }

    /// Iterate over (pattern, replacement) pairs in node order.
    pub fn patterns(&self) -> impl Iterator<Item = (&[u8], Option<&[u8]>)> + '_ {
        self.arena
            .iter()
            .filter_map(|node| Some((node.pattern()?, node.replacement())))
    }

    pub fn stats(&self) -> Stats {
        Stats {
            node_count: self.node_count(),
            pattern_count: self.pattern_count(),
            node_capacity: self.capacity(),
            memory_usage: std::mem::size_of::<Self>()
                .saturating_add(self.arena.memory_usage()),
        }
    }

    /// Remove every pattern, keeping the node allocation.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.compiled = false;
    }
}

//! acsub: multi-pattern search and replace over byte strings
//!
//! Patterns are compiled into a single Aho-Corasick automaton that finds
//! every occurrence of every pattern in one pass over the text. Three
//! replacement strategies sit on top of the scan:
//!
//! - [`Automaton::replace_in_place`] rewrites a caller-owned buffer without
//!   allocating an output
//! - [`Automaton::replace_all`] returns a new buffer, sized once
//! - [`Automaton::replace_with`] asks a callback for each substitution, so a
//!   compiled automaton can be reused with per-call values
//!
//! ```
//! use acsub::Automaton;
//!
//! let mut ac = Automaton::new();
//! ac.add_pattern(b"cat", b"dog").unwrap();
//! ac.add_pattern(b"mouse", b"elephant").unwrap();
//! ac.compile().unwrap();
//!
//! let out = ac.replace_all(b"The cat chased the mouse").unwrap();
//! assert_eq!(out.bytes, b"The dog chased the elephant");
//! assert_eq!(out.replacements, 2);
//! ```
//!
//! A compiled [`Automaton`] is read-only and can be shared across threads.
//! [`SharedAutomaton`] adds lock-free reads with serialized rebuilds for rule
//! tables that change at runtime.

pub mod automaton;
pub mod config;
pub mod error;
pub mod replace;
pub mod rules;
pub mod shared;

pub use automaton::{Automaton, Match, Node, NodeId, Stats};
pub use config::{Config, GrowthPolicy, DEFAULT_NODE_CAPACITY};
pub use error::{AcError, Result};
pub use replace::{select_non_overlapping, InPlace, Replaced};
pub use rules::RuleSet;
pub use shared::SharedAutomaton;

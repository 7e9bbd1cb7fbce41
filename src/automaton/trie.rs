//! Pattern insertion into the byte trie.
//!
//! Each pattern is walked one byte at a time from the root, creating the
//! missing children in the arena. Children are kept sorted by byte so a
//! lookup is a binary search over a handful of entries, and each byte maps
//! to exactly one child.

use std::borrow::Cow;

use super::arena::{NodeArena, NodeId};
use super::Automaton;
use crate::error::{AcError, Result};

impl<U> NodeArena<'_, U> {
    /// Find or create the child of `parent` on `byte`.
    fn get_or_create_child(&mut self, parent: NodeId, byte: u8) -> Result<NodeId> {
        let children = &self[parent].children;
        match children.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(pos) => Ok(children[pos].1),
            Err(pos) => {
                let child = self.alloc()?;
                self[parent].children.insert(pos, (byte, child));
                Ok(child)
            }
        }
    }
}

impl<'a, U> Automaton<'a, U> {
    /// Add a pattern with a static replacement.
    ///
    /// Both spans are borrowed, not copied. Adding a pattern that is already
    /// present replaces its replacement and drops its user data.
    pub fn add_pattern(&mut self, pattern: &'a [u8], replacement: &'a [u8]) -> Result<NodeId> {
        self.insert(
            Cow::Borrowed(pattern),
            Some(Cow::Borrowed(replacement)),
            None,
        )
    }

    /// Add a pattern with optional replacement and user data.
    ///
    /// Patterns without a replacement are only rewritten by
    /// [`replace_with`](Self::replace_with); the static strategies leave them
    /// untouched.
    pub fn add_pattern_with(
        &mut self,
        pattern: &'a [u8],
        replacement: Option<&'a [u8]>,
        user_data: Option<U>,
    ) -> Result<NodeId> {
        self.insert(
            Cow::Borrowed(pattern),
            replacement.map(Cow::Borrowed),
            user_data,
        )
    }

    /// Add a pattern whose bytes are moved into the automaton.
    pub fn add_owned_pattern(
        &mut self,
        pattern: Vec<u8>,
        replacement: Option<Vec<u8>>,
        user_data: Option<U>,
    ) -> Result<NodeId> {
        self.insert(Cow::Owned(pattern), replacement.map(Cow::Owned), user_data)
    }

    /// Insert a pattern and mark its final node terminal.
    ///
    /// The compiled flag is cleared before the walk, so a failed insertion
    /// still forces recompilation. Nodes created before a capacity failure
    /// stay in the trie.
    fn insert(
        &mut self,
        pattern: Cow<'a, [u8]>,
        replacement: Option<Cow<'a, [u8]>>,
        user_data: Option<U>,
    ) -> Result<NodeId> {
        if pattern.is_empty() {
            return Err(AcError::EmptyPattern);
        }

        self.compiled = false;

        let mut node = NodeId::ROOT;
        for &byte in pattern.iter() {
            node = self.arena.get_or_create_child(node, byte)?;
        }

        // Last write wins
        let end = &mut self.arena[node];
        end.terminal = true;
        end.pattern = Some(pattern);
        end.replacement = replacement;
        end.user_data = user_data;
        Ok(node)
    }
}

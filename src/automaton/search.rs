//! The matching scan.
//!
//! Text is streamed through the compiled automaton one byte at a time. After
//! each transition every pattern ending at that position is reported by
//! walking the output chain from the current state, so patterns that are
//! suffixes of a longer match (`bc` inside `abc`) are never missed.

use std::ops::{ControlFlow, Range};

use super::arena::NodeId;
use super::Automaton;
use crate::error::{AcError, Result};

/// One located occurrence of a pattern.
///
/// `end` is inclusive, so `end - start + 1 == pattern.len()`. The pattern and
/// replacement are borrowed from the automaton, not from the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'s> {
    pub start: usize,
    pub end: usize,
    pub pattern: &'s [u8],
    pub replacement: Option<&'s [u8]>,
    /// Terminal node of the pattern
    pub node: NodeId,
}

impl Match<'_> {
    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Length of the static replacement, 0 if there is none.
    pub fn replacement_len(&self) -> usize {
        self.replacement.map_or(0, <[u8]>::len)
    }

    /// Half-open byte range of the match in the text.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end + 1
    }
}

impl<'a, U> Automaton<'a, U> {
    /// Find every occurrence of every pattern, in order of end position.
    ///
    /// Matches ending at the same position are listed longest first, following
    /// the output chain.
    pub fn search(&self, text: &[u8]) -> Result<Vec<Match<'_>>> {
        let mut matches = Vec::new();
        self.search_with(text, |m| {
            matches.push(*m);
            ControlFlow::Continue(())
        })?;
        Ok(matches)
    }

    /// Report each occurrence to `f` until it returns `Break`.
    ///
    /// Returns the number of matches reported, including the one that stopped
    /// the scan.
    pub fn search_with<'s, F>(&'s self, text: &[u8], mut f: F) -> Result<usize>
    where
        F: FnMut(&Match<'s>) -> ControlFlow<()>,
    {
        if !self.compiled {
            return Err(AcError::NotCompiled);
        }

        let mut state = NodeId::ROOT;
        let mut count = 0;

        for (pos, &byte) in text.iter().enumerate() {
            state = self.next_state(state, byte);

            let mut hit = if self.arena[state].terminal {
                state
            } else {
                self.arena[state].output
            };
            while !hit.is_none() {
                if let Some(m) = self.match_at(hit, pos) {
                    count += 1;
                    if f(&m).is_break() {
                        return Ok(count);
                    }
                }
                hit = self.arena[hit].output;
            }
        }

        Ok(count)
    }

    /// Follow failure links until `byte` has a transition, or fall back to root.
    #[inline]
    fn next_state(&self, mut state: NodeId, byte: u8) -> NodeId {
        loop {
            if let Some(next) = self.arena[state].child(byte) {
                return next;
            }
            if state == NodeId::ROOT {
                return NodeId::ROOT;
            }
            state = self.arena[state].failure;
        }
    }

    fn match_at(&self, node: NodeId, end: usize) -> Option<Match<'_>> {
        let terminal = &self.arena[node];
        let pattern = terminal.pattern()?;
        Some(Match {
            start: end + 1 - pattern.len(),
            end,
            pattern,
            replacement: terminal.replacement(),
            node,
        })
    }
}

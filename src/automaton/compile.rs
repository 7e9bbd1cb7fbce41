//! Failure and output link construction.
//!
//! Links are computed breadth-first so that every node's failure target,
//! which is always shallower, is final before the node's own children are
//! visited.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::debug;

use super::arena::{NodeArena, NodeId};
use super::Automaton;
use crate::error::{AcError, Result};

impl<U> Automaton<'_, U> {
    /// Build failure and output links over the trie.
    ///
    /// Must run after the last insertion and before any search. Fails with
    /// `AlreadyCompiled` if nothing was inserted since the previous compile.
    pub fn compile(&mut self) -> Result<()> {
        if self.compiled {
            return Err(AcError::AlreadyCompiled);
        }

        let start = Instant::now();
        build_links(&mut self.arena);
        self.compiled = true;

        let stats = self.stats();
        debug!(
            patterns = stats.pattern_count,
            nodes = stats.node_count,
            memory = stats.memory_usage,
            elapsed_us = start.elapsed().as_micros() as u64,
            "compiled automaton"
        );
        Ok(())
    }
}

fn build_links<U>(arena: &mut NodeArena<'_, U>) {
    let mut queue = VecDeque::with_capacity(arena.len());

    arena[NodeId::ROOT].failure = NodeId::NONE;
    arena[NodeId::ROOT].output = NodeId::NONE;

    // Depth-1 nodes always fail to the root
    for i in 0..arena[NodeId::ROOT].children.len() {
        let (_, child) = arena[NodeId::ROOT].children[i];
        let node = &mut arena[child];
        node.failure = NodeId::ROOT;
        node.output = NodeId::NONE;
        queue.push_back(child);
    }

    while let Some(current) = queue.pop_front() {
        for i in 0..arena[current].children.len() {
            let (byte, child) = arena[current].children[i];
            queue.push_back(child);

            let mut fallback = arena[current].failure;
            let failure = loop {
                if fallback.is_none() {
                    break NodeId::ROOT;
                }
                if let Some(next) = arena[fallback].child(byte) {
                    break next;
                }
                fallback = arena[fallback].failure;
            };

            let output = if arena[failure].terminal {
                failure
            } else {
                arena[failure].output
            };

            let node = &mut arena[child];
            node.failure = failure;
            node.output = output;
        }
    }
}

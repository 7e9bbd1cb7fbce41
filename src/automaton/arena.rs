//! Arena-based node allocation for the trie and its automaton links.
//!
//! Every node lives in one contiguous `Vec` and is referenced by `NodeId`.
//! Failure and output links are plain indices, so they can point anywhere in
//! the arena (including back toward the root) without any ownership between
//! nodes. Nodes are never freed one by one; the arena is cleared or dropped
//! as a unit.
//!
//! The arena has an explicit capacity. Allocating past it fails unless the
//! growth policy allows doubling, or the caller raised the limit with
//! [`NodeArena::reserve`]. The capacity is a limit, not a reservation: node
//! storage grows as nodes are created, at most `DEFAULT_NODE_CAPACITY` nodes
//! are set aside up front.

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::config::{GrowthPolicy, DEFAULT_NODE_CAPACITY};
use crate::error::{AcError, Result};

/// Handle to an automaton state: its position in the node arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node, created with the arena.
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node" (null failure or output link).
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One trie/automaton state.
#[derive(Clone)]
pub struct Node<'a, U> {
    /// Children as (byte, id) pairs, kept sorted by byte
    pub(crate) children: SmallVec<[(u8, NodeId); 4]>,
    /// Longest proper suffix state, set by compilation
    pub(crate) failure: NodeId,
    /// Nearest terminal node on the failure chain
    pub(crate) output: NodeId,
    pub(crate) pattern: Option<Cow<'a, [u8]>>,
    pub(crate) replacement: Option<Cow<'a, [u8]>>,
    pub(crate) user_data: Option<U>,
    pub(crate) terminal: bool,
    id: NodeId,
}

impl<U> std::fmt::Debug for Node<'_, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("children_count", &self.children.len())
            .field("failure", &self.failure)
            .field("output", &self.output)
            .field("terminal", &self.terminal)
            .finish()
    }
}

impl<'a, U> Node<'a, U> {
    fn new(id: NodeId) -> Self {
        Self {
            children: SmallVec::new(),
            failure: NodeId::NONE,
            output: NodeId::NONE,
            pattern: None,
            replacement: None,
            user_data: None,
            terminal: false,
            id,
        }
    }

    /// Stable identifier of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// True if an inserted pattern ends here.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The child reached on `byte`, if any.
    #[inline]
    pub fn child(&self, byte: u8) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|pos| self.children[pos].1)
    }

    pub fn failure(&self) -> NodeId {
        self.failure
    }

    pub fn output(&self) -> NodeId {
        self.output
    }

    /// The pattern ending at this node.
    pub fn pattern(&self) -> Option<&[u8]> {
        self.pattern.as_deref()
    }

    /// The static replacement registered with the pattern.
    pub fn replacement(&self) -> Option<&[u8]> {
        self.replacement.as_deref()
    }

    pub fn user_data(&self) -> Option<&U> {
        self.user_data.as_ref()
    }

    /// Heap bytes owned by this node beyond its inline size.
    fn heap_usage(&self) -> usize {
        let children = if self.children.spilled() {
            self.children.capacity() * std::mem::size_of::<(u8, NodeId)>()
        } else {
            0
        };
        let owned = |span: &Option<Cow<'a, [u8]>>| match span {
            Some(Cow::Owned(bytes)) => bytes.capacity(),
            _ => 0,
        };
        children + owned(&self.pattern) + owned(&self.replacement)
    }
}

/// Fixed-capacity arena of automaton nodes.
#[derive(Clone)]
pub struct NodeArena<'a, U> {
    nodes: Vec<Node<'a, U>>,
    capacity: usize,
    growth: GrowthPolicy,
}

impl<U> std::fmt::Debug for NodeArena<'_, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeArena")
            .field("nodes_count", &self.nodes.len())
            .field("capacity", &self.capacity)
            .field("growth", &self.growth)
            .finish()
    }
}

impl<'a, U> NodeArena<'a, U> {
    /// Create an arena holding only the root node.
    pub fn new(capacity: usize, growth: GrowthPolicy) -> Self {
        // u32::MAX is the NONE sentinel
        let capacity = capacity.clamp(1, u32::MAX as usize);
        let mut nodes = Vec::with_capacity(capacity.min(DEFAULT_NODE_CAPACITY));
        nodes.push(Node::new(NodeId::ROOT));
        Self {
            nodes,
            capacity,
            growth,
        }
    }

    /// Allocate a fresh node, returning its ID.
    pub fn alloc(&mut self) -> Result<NodeId> {
        if self.nodes.len() >= self.capacity && self.growth == GrowthPolicy::Double {
            self.reserve(self.capacity);
        }
        if self.nodes.len() >= self.capacity {
            return Err(AcError::CapacityExhausted {
                capacity: self.capacity,
            });
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| AcError::Allocation {
                requested: std::mem::size_of::<Node<'a, U>>(),
            })?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id));
        Ok(id)
    }

    /// Raise the capacity by `additional` nodes, up to `u32::MAX`.
    ///
    /// Only the limit moves; storage is allocated by [`alloc`](Self::alloc).
    pub fn reserve(&mut self, additional: usize) {
        self.capacity = self
            .capacity
            .saturating_add(additional)
            .min(u32::MAX as usize);
    }

    /// Drop every node except a fresh root. The allocation is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new(NodeId::ROOT));
    }

    /// Get a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node<'a, U>> {
        if id.is_none() {
            None
        } else {
            self.nodes.get(id.index())
        }
    }

    /// Number of allocated nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists for the arena's whole life.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<'a, U>> + '_ {
        self.nodes.iter()
    }

    /// Estimated memory footprint of the arena in bytes.
    pub fn memory_usage(&self) -> usize {
        self.capacity
            .saturating_mul(std::mem::size_of::<Node<'a, U>>())
            .saturating_add(self.nodes.iter().map(Node::heap_usage).sum::<usize>())
    }
}

impl<'a, U> std::ops::Index<NodeId> for NodeArena<'a, U> {
    type Output = Node<'a, U>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl<U> std::ops::IndexMut<NodeId> for NodeArena<'_, U> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.index()]
    }
}

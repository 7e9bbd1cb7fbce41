//! Construction-time settings for an automaton.

/// Node capacity used when none is given.
pub const DEFAULT_NODE_CAPACITY: usize = 1024;

/// What happens when pattern insertion needs a node past the arena capacity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Insertion fails with `AcError::CapacityExhausted`.
    #[default]
    Fixed,
    /// The capacity doubles whenever the arena is full.
    Double,
}

/// Settings for [`Automaton`](crate::Automaton) construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub node_capacity: usize,
    pub growth: GrowthPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            growth: GrowthPolicy::Fixed,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node capacity. Zero selects [`DEFAULT_NODE_CAPACITY`].
    pub fn node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = if capacity == 0 {
            DEFAULT_NODE_CAPACITY
        } else {
            capacity
        };
        self
    }

    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }
}

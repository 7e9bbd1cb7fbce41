//! Thread-safe automaton with atomic rebuilds.
//!
//! Readers load the published automaton without locking. Writers stage
//! pattern changes under a mutex and make them visible with
//! [`SharedAutomaton::publish`], which compiles the staged automaton and
//! swaps it in atomically. A reader holding an old snapshot keeps using it
//! until it drops its `Arc`.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::automaton::{Automaton, NodeId, Stats};
use crate::config::Config;
use crate::error::Result;
use crate::replace::Replaced;

/// A compiled automaton that can be rebuilt while it is being searched.
pub struct SharedAutomaton<U = ()> {
    /// The published automaton - atomically swappable, lock-free reads
    current: ArcSwap<Automaton<'static, U>>,
    /// Mutex protecting pattern staging
    staged: Mutex<Automaton<'static, U>>,
}

// SharedAutomaton is Send + Sync when U is:
// - ArcSwap<T> is Send + Sync when T is Send + Sync
// - Mutex<T> is Send + Sync when T is Send

impl<U> Default for SharedAutomaton<U> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<U> SharedAutomaton<U> {
    /// Create a shared automaton that matches nothing until the first publish.
    pub fn new(config: Config) -> Self {
        Self {
            current: ArcSwap::from_pointee(Automaton::empty(config)),
            staged: Mutex::new(Automaton::with_config(config)),
        }
    }

    /// Stage a pattern. It takes effect at the next `publish`.
    ///
    /// Serialized with other writers; readers are never blocked.
    pub fn add_pattern(
        &self,
        pattern: Vec<u8>,
        replacement: Option<Vec<u8>>,
        user_data: Option<U>,
    ) -> Result<NodeId> {
        self.staged
            .lock()
            .add_owned_pattern(pattern, replacement, user_data)
    }

    /// Drop every staged pattern. The published automaton is unchanged.
    pub fn reset(&self) {
        self.staged.lock().reset();
    }

    /// True if staged changes have not been published yet.
    pub fn has_pending(&self) -> bool {
        !self.staged.lock().is_compiled()
    }

    /// Snapshot of the published automaton.
    pub fn load(&self) -> Arc<Automaton<'static, U>> {
        self.current.load_full()
    }

    /// Replace matches using the published automaton.
    pub fn replace_all(&self, text: &[u8]) -> Result<Replaced> {
        self.current.load().replace_all(text)
    }
}

impl<U: Clone> SharedAutomaton<U> {
    /// Compile the staged patterns and make them visible to readers.
    pub fn publish(&self) -> Result<Stats> {
        let mut staged = self.staged.lock();
        if !staged.is_compiled() {
            staged.compile()?;
        }

        let snapshot = Arc::new(staged.clone());
        let stats = snapshot.stats();
        self.current.store(snapshot);

        debug!(
            patterns = stats.pattern_count,
            nodes = stats.node_count,
            "published automaton"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_until_published() {
        let shared: SharedAutomaton = SharedAutomaton::default();
        shared
            .add_pattern(b"cat".to_vec(), Some(b"dog".to_vec()), None)
            .unwrap();
        assert!(shared.has_pending());

        assert_eq!(shared.replace_all(b"cat").unwrap().bytes, b"cat");

        let stats = shared.publish().unwrap();
        assert_eq!(stats.pattern_count, 1);
        assert!(!shared.has_pending());
        assert_eq!(shared.replace_all(b"cat").unwrap().bytes, b"dog");
    }

    #[test]
    fn test_old_snapshot_survives_publish() {
        let shared: SharedAutomaton = SharedAutomaton::default();
        shared
            .add_pattern(b"a".to_vec(), Some(b"1".to_vec()), None)
            .unwrap();
        shared.publish().unwrap();
        let before = shared.load();

        shared
            .add_pattern(b"b".to_vec(), Some(b"2".to_vec()), None)
            .unwrap();
        shared.publish().unwrap();

        assert_eq!(before.replace_all(b"ab").unwrap().bytes, b"1b");
        assert_eq!(shared.load().replace_all(b"ab").unwrap().bytes, b"12");
    }

    #[test]
    fn test_publish_twice_without_changes() {
        let shared: SharedAutomaton = SharedAutomaton::default();
        shared
            .add_pattern(b"x".to_vec(), Some(b"y".to_vec()), None)
            .unwrap();
        shared.publish().unwrap();
        let stats = shared.publish().unwrap();
        assert_eq!(stats.pattern_count, 1);
    }

    #[test]
    fn test_reset_applies_on_publish() {
        let shared: SharedAutomaton = SharedAutomaton::default();
        shared
            .add_pattern(b"x".to_vec(), Some(b"y".to_vec()), None)
            .unwrap();
        shared.publish().unwrap();

        shared.reset();
        assert_eq!(shared.replace_all(b"x").unwrap().bytes, b"y");
        shared.publish().unwrap();
        assert_eq!(shared.replace_all(b"x").unwrap().bytes, b"x");
    }

    #[test]
    fn test_readers_during_rebuild() {
        let shared = Arc::new(SharedAutomaton::<&'static str>::default());
        shared
            .add_pattern(b"{{ENV}}".to_vec(), None, Some("env"))
            .unwrap();
        shared.publish().unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let ac = shared.load();
                        let out = ac
                            .replace_with(b"[{{ENV}}]", &"prod", |_, tag, ctx| match tag {
                                Some(&"env") => ctx.as_bytes(),
                                _ => b"?".as_slice(),
                            })
                            .unwrap();
                        assert_eq!(out.bytes, b"[prod]");
                    }
                })
            })
            .collect();

        for i in 0..10 {
            shared
                .add_pattern(format!("k{i}").into_bytes(), Some(b"v".to_vec()), None)
                .unwrap();
            shared.publish().unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.load().pattern_count(), 11);
    }
}

//! Shuffle-cycle traversal order
//!
//! Shuffle is a traversal order over the queue, not a reordering of it:
//! the queue keeps insertion order so turning shuffle off falls back to
//! the same queue.

use rand::seq::SliceRandom;
use rand::thread_rng;

/// Pending shuffled indices for the current shuffle cycle
///
/// Regenerated lazily on advance whenever the cycle is exhausted, and
/// cleared whenever shuffle is toggled or the queue changes.
#[derive(Debug, Clone, Default)]
pub(crate) struct ShuffleCycle {
    remaining: Vec<usize>,
}

impl ShuffleCycle {
    pub fn new() -> Self {
        Self {
            remaining: Vec::new(),
        }
    }

    /// Drop pending indices, forcing a fresh cycle on the next advance
    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    /// Pop the next index, regenerating the cycle when exhausted.
    ///
    /// A fresh cycle is a uniform Fisher-Yates permutation of all queue
    /// indices except `exclude` (the track playing when the cycle is
    /// built). Returns `None` when no other index exists.
    pub fn next_index(&mut self, queue_len: usize, exclude: Option<usize>) -> Option<usize> {
        if queue_len == 0 {
            return None;
        }
        if self.remaining.is_empty() {
            self.regenerate(queue_len, exclude);
        }
        self.remaining.pop()
    }

    fn regenerate(&mut self, queue_len: usize, exclude: Option<usize>) {
        self.remaining = (0..queue_len).filter(|i| Some(*i) != exclude).collect();
        self.remaining.shuffle(&mut thread_rng());
    }
}

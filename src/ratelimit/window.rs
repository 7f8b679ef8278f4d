//! Per-key record of recent request instants.

use std::collections::VecDeque;

/// The request instants seen for one key, oldest first.
///
/// Instants are inserted at their sorted position, so the queue stays in
/// chronological order even when callers supply out-of-order instants or
/// the clock steps backwards. Pruning only touches the front.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    timestamps: VecDeque<f64>,
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every instant at or before `cutoff`.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, cutoff: f64) -> usize {
        let before = self.timestamps.len();
        while let Some(&front) = self.timestamps.front() {
            if front > cutoff {
                break;
            }
            self.timestamps.pop_front();
        }
        before - self.timestamps.len()
    }

    /// Record a request at `instant`.
    pub fn record(&mut self, instant: f64) {
        let at = self.timestamps.partition_point(|&t| t <= instant);
        self.timestamps.insert(at, instant);
    }

    /// The earliest recorded instant.
    pub fn oldest(&self) -> Option<f64> {
        self.timestamps.front().copied()
    }

    /// Number of recorded instants.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether no instants are recorded.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

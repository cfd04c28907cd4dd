//! Page I/O and structural statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by the page store and the tree.
///
/// Each counter is independent and only ever read as a snapshot, so
/// `Ordering::Relaxed` is enough.
///
/// # Example
/// ```
/// use pagetree::IoStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IoStats::new();
/// stats.pages_read.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().pages_read, 1);
/// ```
#[derive(Debug, Default)]
pub struct IoStats {
    /// Pages read from disk.
    pub pages_read: AtomicU64,

    /// Pages written to disk (including header flushes).
    pub pages_written: AtomicU64,

    /// Pages appended to the file.
    pub pages_allocated: AtomicU64,

    /// Leaf nodes split during insertion.
    pub leaf_splits: AtomicU64,

    /// Internal nodes split during insertion.
    pub internal_splits: AtomicU64,

    /// New roots created above a split root.
    pub root_promotions: AtomicU64,
}

impl IoStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
            leaf_splits: self.leaf_splits.load(Ordering::Relaxed),
            internal_splits: self.internal_splits.load(Ordering::Relaxed),
            root_promotions: self.root_promotions.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`IoStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
    pub leaf_splits: u64,
    pub internal_splits: u64,
    pub root_promotions: u64,
}

impl StatsSnapshot {
    /// Total splits of either node kind.
    pub fn splits(&self) -> u64 {
        self.leaf_splits + self.internal_splits
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, writes: {}, allocated: {}, leaf splits: {}, internal splits: {}, root promotions: {} }}",
            self.pages_read,
            self.pages_written,
            self.pages_allocated,
            self.leaf_splits,
            self.internal_splits,
            self.root_promotions
        )
    }
}

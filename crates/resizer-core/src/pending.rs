//! Registry of target ranges with a rewrite in flight.
//!
//! Rewriting an array formula makes the host recalculate it, which calls the
//! function again and may request the very same resize before the first one
//! has finished. The registry lets the first request for a range win; later
//! requests for that range are dropped until it is released.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use resizer_engine::engine::CellRange;

#[derive(Debug, Default)]
pub struct PendingResizes {
    ranges: Mutex<HashSet<CellRange>>,
}

impl PendingResizes {
    pub fn new() -> Self {
        Self::default()
    }

    fn ranges(&self) -> MutexGuard<'_, HashSet<CellRange>> {
        self.ranges.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `range` unless it is already pending. Returns whether it was
    /// inserted; the check and the insert happen under one lock.
    pub fn try_acquire(&self, range: CellRange) -> bool {
        self.ranges().insert(range)
    }

    /// Remove `range`. Removing a range that is not pending is a no-op.
    pub fn release(&self, range: &CellRange) {
        self.ranges().remove(range);
    }

    pub fn contains(&self, range: &CellRange) -> bool {
        self.ranges().contains(range)
    }

    pub fn len(&self) -> usize {
        self.ranges().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges().is_empty()
    }

    /// Like [`try_acquire`](Self::try_acquire), returning a slot that
    /// releases the range when dropped.
    pub fn acquire(self: &Arc<Self>, range: CellRange) -> Option<PendingSlot> {
        self.try_acquire(range).then(|| PendingSlot {
            registry: Arc::clone(self),
            range,
        })
    }
}

/// Membership of one range in a [`PendingResizes`] registry.
#[derive(Debug)]
pub struct PendingSlot {
    registry: Arc<PendingResizes>,
    range: CellRange,
}

impl PendingSlot {
    pub fn range(&self) -> &CellRange {
        &self.range
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        self.registry.release(&self.range);
    }
}

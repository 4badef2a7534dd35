//! Latest-value slot for incoming point sets.
//!
//! Shared between:
//! - Receiver thread: replaces the slot whenever a cloud arrives
//! - Fit thread: snapshots the slot once per tick
//!
//! Clouds are never queued. A replace drops the previous set; a snapshot
//! clones the `Arc`, so the lock is held only for a pointer swap and a
//! reader can never see a half-written set.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::types::PointSet;

/// A point set together with its arrival sequence number.
#[derive(Debug, Clone)]
pub struct PointSetSnapshot {
    /// Monotonic arrival counter, starting at 1 for the first set.
    pub sequence: u64,
    /// The captured points.
    pub points: Arc<PointSet>,
}

#[derive(Debug, Default)]
struct Slot {
    latest: Option<Arc<PointSet>>,
    sequence: u64,
}

/// Cloneable handle to the shared slot.
#[derive(Debug, Clone, Default)]
pub struct PointSetBuffer {
    slot: Arc<Mutex<Slot>>,
}

impl PointSetBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored set and return its sequence number.
    pub fn replace(&self, points: PointSet) -> u64 {
        let points = Arc::new(points);
        let mut slot = self.slot.lock();
        slot.sequence += 1;
        slot.latest = Some(points);
        slot.sequence
    }

    /// Most recent set, if any has arrived.
    pub fn snapshot(&self) -> Option<PointSetSnapshot> {
        let slot = self.slot.lock();
        slot.latest.as_ref().map(|points| PointSetSnapshot {
            sequence: slot.sequence,
            points: Arc::clone(points),
        })
    }
}

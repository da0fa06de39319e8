//! Single-writer execution lane.
//!
//! Vocabulary creation and relation writes are read-modify-write sequences
//! over the store. They run one at a time; readers never enter the lane.

use tokio::sync::{Mutex, MutexGuard};

/// Serializes graph mutations issued by the core
#[derive(Debug, Default)]
pub struct WriteLane {
    inner: Mutex<()>,
}

/// Proof that the holder is the lane's only writer
#[derive(Debug)]
pub struct LaneGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl WriteLane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access
    pub async fn enter(&self) -> LaneGuard<'_> {
        LaneGuard {
            _guard: self.inner.lock().await,
        }
    }
}

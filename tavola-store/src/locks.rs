use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per (resource, date) mutual exclusion for reservation writes.
///
/// Every mutation and every cache fill for a (resource, date) key runs
/// under that key's mutex, which is what upholds the capacity invariant
/// across the check-then-write sequence.
pub struct DayLocks {
    locks: DashMap<(Uuid, NaiveDate), Arc<Mutex<()>>>,
}

impl DayLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub async fn acquire(&self, resource_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry((resource_id, date))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Acquire two keys in sorted order so concurrent cross-day modifies
    /// cannot deadlock. A single guard is returned when the keys coincide.
    pub async fn acquire_pair(
        &self,
        first: (Uuid, NaiveDate),
        second: (Uuid, NaiveDate),
    ) -> Vec<OwnedMutexGuard<()>> {
        if first == second {
            return vec![self.acquire(first.0, first.1).await];
        }
        let (lo, hi) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        vec![
            self.acquire(lo.0, lo.1).await,
            self.acquire(hi.0, hi.1).await,
        ]
    }
}

impl Default for DayLocks {
    fn default() -> Self {
        Self::new()
    }
}

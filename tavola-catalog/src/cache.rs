use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use tavola_core::slot::SlotAvailability;

/// Write-invalidate cache of scheduler output, keyed by (resource, date).
///
/// Compute-on-miss: callers fill entries after a miss and must invalidate
/// the key on every reservation write that touches it. There is no eviction
/// beyond invalidation; the cache lives as long as the service instance.
pub struct AvailabilityCache {
    entries: RwLock<HashMap<(Uuid, NaiveDate), Vec<SlotAvailability>>>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, resource_id: Uuid, date: NaiveDate) -> Option<Vec<SlotAvailability>> {
        let entries = self.entries.read().await;
        let hit = entries.get(&(resource_id, date)).cloned();
        if hit.is_some() {
            debug!("Availability cache hit: {} {}", resource_id, date);
        }
        hit
    }

    pub async fn insert(&self, resource_id: Uuid, date: NaiveDate, slots: Vec<SlotAvailability>) {
        let mut entries = self.entries.write().await;
        entries.insert((resource_id, date), slots);
    }

    pub async fn invalidate(&self, resource_id: Uuid, date: NaiveDate) {
        let mut entries = self.entries.write().await;
        if entries.remove(&(resource_id, date)).is_some() {
            debug!("Availability cache invalidated: {} {}", resource_id, date);
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::new()
    }
}

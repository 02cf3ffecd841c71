use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::resource::ResourceConfig;

/// One open interval for a resource: slot start plus seats still free.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotAvailability {
    pub start: NaiveTime,
    pub remaining: u32,
}

/// The full slot grid for a resource, ordered by start time.
///
/// Slots step from `open` in `slot_minutes` increments; the last slot must
/// end at or before `close`.
pub fn slot_starts(config: &ResourceConfig) -> Vec<NaiveTime> {
    let window_minutes = (config.close - config.open).num_minutes();
    let step = i64::from(config.slot_minutes);
    let count = window_minutes / step;

    (0..count)
        .map(|i| config.open + chrono::Duration::minutes(i * step))
        .collect()
}

/// Whether `start` lands on the resource's slot grid.
pub fn is_on_grid(config: &ResourceConfig, start: NaiveTime) -> bool {
    if start < config.open {
        return false;
    }
    let offset = (start - config.open).num_minutes();
    if offset % i64::from(config.slot_minutes) != 0 {
        return false;
    }
    // Minute arithmetic: NaiveTime addition wraps at midnight
    let window = (config.close - config.open).num_minutes();
    offset + i64::from(config.slot_minutes) <= window
}

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable unit (a table, a private room) with finite per-slot capacity.
///
/// Loaded once at startup from configuration and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub id: Uuid,
    pub name: String,
    /// Covers that can be seated in a single slot.
    pub capacity: u32,
    pub open: NaiveTime,
    pub close: NaiveTime,
    /// Length of one bookable slot, in minutes.
    pub slot_minutes: u32,
}

impl ResourceConfig {
    /// Validate the static configuration. Invalid entries must fail startup.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.capacity == 0 {
            return Err(ResourceError::ZeroCapacity(self.name.clone()));
        }
        if self.open >= self.close {
            return Err(ResourceError::InvalidHours {
                resource: self.name.clone(),
                open: self.open,
                close: self.close,
            });
        }
        if self.slot_minutes == 0 {
            return Err(ResourceError::InvalidSlotDuration {
                resource: self.name.clone(),
                slot_minutes: self.slot_minutes,
            });
        }
        let window_minutes = (self.close - self.open).num_minutes();
        if i64::from(self.slot_minutes) > window_minutes {
            return Err(ResourceError::InvalidSlotDuration {
                resource: self.name.clone(),
                slot_minutes: self.slot_minutes,
            });
        }
        Ok(())
    }

    pub fn slot_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.slot_minutes))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource {0} has zero capacity")]
    ZeroCapacity(String),

    #[error("Resource {resource} has invalid operating hours: open {open}, close {close}")]
    InvalidHours {
        resource: String,
        open: NaiveTime,
        close: NaiveTime,
    },

    #[error("Resource {resource} has invalid slot duration: {slot_minutes} minutes")]
    InvalidSlotDuration { resource: String, slot_minutes: u32 },

    #[error("Duplicate resource id: {0}")]
    DuplicateId(Uuid),

    #[error("Resource not found: {0}")]
    NotFound(Uuid),
}

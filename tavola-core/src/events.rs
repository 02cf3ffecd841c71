use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationEventKind {
    Created,
    Modified,
    Cancelled,
}

/// Broadcast payload emitted after every successful reservation write.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReservationEvent {
    pub kind: ReservationEventKind,
    pub reservation_id: Uuid,
    pub resource_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
    pub party_size: u32,
    pub occurred_at: i64,
}

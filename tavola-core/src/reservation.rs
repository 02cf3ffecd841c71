use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
    pub party_size: u32,
    pub contact: ContactInfo,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        resource_id: Uuid,
        date: NaiveDate,
        slot_start: NaiveTime,
        party_size: u32,
        contact: ContactInfo,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            resource_id,
            date,
            slot_start,
            party_size,
            contact,
            status: ReservationStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cancelled reservations release their seats; everything else holds them.
    pub fn counts_against_capacity(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Modified,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Active => write!(f, "ACTIVE"),
            ReservationStatus::Modified => write!(f, "MODIFIED"),
            ReservationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

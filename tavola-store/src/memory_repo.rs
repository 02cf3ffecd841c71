use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use tavola_core::repository::ReservationRepository;
use tavola_core::reservation::Reservation;

/// In-memory reservation store.
///
/// Owns every reservation record; callers mutate only through the
/// repository trait. Thread safety covers individual operations; the
/// capacity invariant across check-then-write sequences is the job of the
/// per (resource, date) locks in [`crate::locks::DayLocks`].
pub struct InMemoryReservationStore {
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationStore {
    async fn insert(
        &self,
        reservation: Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut reservations = self.reservations.write().await;
        info!(
            "Reservation stored: {} ({} on {})",
            reservation.id, reservation.resource_id, reservation.date
        );
        reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        let reservations = self.reservations.read().await;
        Ok(reservations.get(&id).cloned())
    }

    async fn update(
        &self,
        reservation: Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut reservations = self.reservations.write().await;
        if !reservations.contains_key(&reservation.id) {
            return Err(Box::new(StoreError::NotFound(reservation.id)));
        }
        reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn list_for_day(
        &self,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .values()
            .filter(|r| r.resource_id == resource_id && r.date == date)
            .cloned()
            .collect())
    }

    async fn list(
        &self,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        let reservations = self.reservations.read().await;
        let mut all: Vec<Reservation> = reservations.values().cloned().collect();
        all.sort_by_key(|r| (r.date, r.slot_start, r.created_at));
        Ok(all)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Reservation not found: {0}")]
    NotFound(Uuid),
}

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::reservation::Reservation;

/// Repository trait for reservation data access.
///
/// The in-memory store is the only implementation today; the seam exists so
/// a persistent backend can be swapped in without touching callers.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert(
        &self,
        reservation: Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update(
        &self,
        reservation: Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_day(
        &self,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list(
        &self,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>>;
}

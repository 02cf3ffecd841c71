use std::sync::Arc;

use tokio::sync::broadcast;

use tavola_catalog::{AvailabilityCache, ResourceRegistry};
use tavola_core::events::ReservationEvent;
use tavola_core::repository::ReservationRepository;
use tavola_store::app_config::BookingRules;
use tavola_store::{DayLocks, MenuStore};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ResourceRegistry>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub cache: Arc<AvailabilityCache>,
    pub menu: Arc<MenuStore>,
    pub locks: Arc<DayLocks>,
    pub events_tx: broadcast::Sender<ReservationEvent>,
    pub rules: BookingRules,
}

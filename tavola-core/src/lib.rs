pub mod events;
pub mod repository;
pub mod reservation;
pub mod resource;
pub mod slot;

pub use events::{ReservationEvent, ReservationEventKind};
pub use repository::ReservationRepository;
pub use reservation::{ContactInfo, Reservation, ReservationStatus};
pub use resource::{ResourceConfig, ResourceError};
pub use slot::SlotAvailability;

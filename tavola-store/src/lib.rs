pub mod app_config;
pub mod locks;
pub mod memory_repo;
pub mod menu;

pub use locks::DayLocks;
pub use memory_repo::InMemoryReservationStore;
pub use menu::{MenuItem, MenuStore};

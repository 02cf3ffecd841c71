pub mod cache;
pub mod registry;
pub mod scheduler;

pub use cache::AvailabilityCache;
pub use registry::{RegistryError, ResourceRegistry};

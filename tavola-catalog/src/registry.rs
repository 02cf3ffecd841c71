use std::collections::HashMap;

use uuid::Uuid;

use tavola_core::resource::{ResourceConfig, ResourceError};

/// Immutable lookup of the configured bookable resources.
///
/// Built once at startup; every entry is validated before the registry
/// exists, so downstream code never sees an invalid resource.
pub struct ResourceRegistry {
    resources: HashMap<Uuid, ResourceConfig>,
}

impl ResourceRegistry {
    pub fn from_configs(configs: Vec<ResourceConfig>) -> Result<Self, RegistryError> {
        let mut resources = HashMap::with_capacity(configs.len());

        for config in configs {
            config.validate()?;
            if resources.contains_key(&config.id) {
                return Err(RegistryError::Resource(ResourceError::DuplicateId(config.id)));
            }
            resources.insert(config.id, config);
        }

        if resources.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self { resources })
    }

    pub fn get(&self, id: &Uuid) -> Option<&ResourceConfig> {
        self.resources.get(id)
    }

    /// All resources, ordered by name for stable listings.
    pub fn list(&self) -> Vec<&ResourceConfig> {
        let mut all: Vec<&ResourceConfig> = self.resources.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("No resources configured")]
    Empty,
}

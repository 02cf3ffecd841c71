use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: u32,
    pub category: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Read-only menu data, loaded from a JSON file once at startup.
pub struct MenuStore {
    items: Vec<MenuItem>,
}

impl MenuStore {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MenuError> {
        let raw = std::fs::read_to_string(path)?;
        let items: Vec<MenuItem> = serde_json::from_str(&raw)?;
        Ok(Self { items })
    }

    pub fn from_items(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Case-insensitive category lookup; empty when the category is unknown.
    pub fn by_category(&self, category: &str) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| item.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.items.iter().map(|item| item.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse menu file: {0}")]
    Parse(#[from] serde_json::Error),
}

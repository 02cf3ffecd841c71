use serde::Deserialize;
use std::env;

use tavola_core::resource::ResourceConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub booking: BookingRules,
    pub menu: MenuConfig,
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_max_party_size")]
    pub max_party_size: u32,
    /// How far ahead a reservation may be placed, in days.
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: u32,
}

fn default_max_party_size() -> u32 {
    12
}

fn default_max_days_ahead() -> u32 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuConfig {
    pub path: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `TAVOLA__SERVER__PORT=9000` overrides server.port
            .add_source(config::Environment::with_prefix("TAVOLA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

use std::path::Path;

use serde::Deserialize;

use crate::error::BitHistError;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// Total budget of live states before the throttling policy activates.
    pub capacity: u32,
    /// Percentage of `capacity` at which novel transitions stop allocating
    /// and fold back to the root.
    pub throttle_percent: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            capacity: 32_768,
            throttle_percent: 90,
        }
    }
}

impl ModelConfig {
    /// Loads the config from a TOML file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, BitHistError> {
        let raw = std::fs::read_to_string(path)?;
        let config: ModelConfig = toml::from_str(&raw)
            .map_err(|e| BitHistError::Config(format!("{}: {}", path.display(), e)))?;
        if config.capacity == 0 {
            return Err(BitHistError::Config("capacity must be non-zero".into()));
        }
        if config.throttle_percent > 100 {
            return Err(BitHistError::Config(
                "throttle_percent must be in 0..=100".into(),
            ));
        }
        Ok(config)
    }
}

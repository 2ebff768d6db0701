//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading CAO policy
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{CaoConfig, CaoMetadata, LimitsConfig, PremiumConfig};

/// Loads and provides access to the CAO policy configuration.
///
/// # Directory Structure
///
/// ```text
/// config/cao-beveiliging/
/// ├── cao.yaml       # Agreement metadata
/// ├── premiums.yaml  # Premium multipliers, night window, vakantiegeld
/// └── limits.yaml    # Working limits, verification, inference thresholds
/// ```
///
/// # Example
///
/// ```no_run
/// use cao_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/cao-beveiliging").unwrap();
/// let config = loader.config();
/// println!("Agreement: {}", config.metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: CaoConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing or contains
    /// invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<CaoMetadata>(&path.join("cao.yaml"))?;
        let premiums = Self::load_yaml::<PremiumConfig>(&path.join("premiums.yaml"))?;
        let limits = Self::load_yaml::<LimitsConfig>(&path.join("limits.yaml"))?;

        Ok(Self {
            config: CaoConfig::new(metadata, premiums, limits),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &CaoConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> CaoConfig {
        self.config
    }
}

//! Engine configuration loading from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// Default number of Monte Carlo trajectories per simulation run.
pub const DEFAULT_TRAJECTORIES: usize = 10_000;

/// Default base seed for deterministic simulation streams.
pub const DEFAULT_BASE_SEED: u64 = 0x7261_6964;

/// Settings for the percentile simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of independent trajectories per run.
    pub trajectories: usize,
    /// Base seed from which per-trajectory streams are derived.
    pub base_seed: u64,
    /// Worker thread override. None uses the global thread pool.
    pub workers: Option<usize>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            trajectories: DEFAULT_TRAJECTORIES,
            base_seed: DEFAULT_BASE_SEED,
            workers: None,
        }
    }
}

impl SimulationSettings {
    /// Validate settings before a run.
    pub fn validate(&self) -> EngineResult<()> {
        if self.trajectories == 0 {
            return Err(EngineError::InvalidInput(
                "trajectories must be at least 1".to_string(),
            ));
        }
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(EngineError::InvalidInput(
                    "workers must be at least 1 when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation settings.
    pub simulation: SimulationSettings,
}

impl EngineConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.simulation.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = EngineConfig::default();
        assert_eq!(config.simulation.trajectories, DEFAULT_TRAJECTORIES);
        assert!(config.simulation.workers.is_none());
        assert!(config.simulation.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [simulation]
            trajectories = 2000
            base_seed = 42
            workers = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.trajectories, 2000);
        assert_eq!(config.simulation.base_seed, 42);
        assert_eq!(config.simulation.workers, Some(4));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("[simulation]\nbase_seed = 7\n").unwrap();
        assert_eq!(config.simulation.base_seed, 7);
        assert_eq!(config.simulation.trajectories, DEFAULT_TRAJECTORIES);
    }

    #[test]
    fn test_zero_trajectories_rejected() {
        let result = EngineConfig::from_toml_str("[simulation]\ntrajectories = 0\n");
        assert!(result.is_err());
    }
}

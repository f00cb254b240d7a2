//! Run configuration.

use evsim_core::Time;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An invalid [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("simulation length must not be negative (got {0})")]
    NegativeLength(Time),
    #[error("at least one simulation must be run")]
    NoSimulations,
}

/// The parameters of a batch of simulation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SimConfig {
    /// The master seed every run's generator is derived from.
    pub random_seed: u64,
    /// Every run executes until this time.
    pub sim_length: Time,
    /// How many independent runs to perform.
    #[serde(default = "default_num_sims")]
    pub num_sims: u32,
}

const fn default_num_sims() -> u32 {
    1
}

impl SimConfig {
    /// Creates a config for a single run.
    pub const fn new(random_seed: u64, sim_length: Time) -> Self {
        Self {
            random_seed,
            sim_length,
            num_sims: 1,
        }
    }

    /// Sets the number of runs.
    pub fn with_num_sims(mut self, num_sims: u32) -> Self {
        self.num_sims = num_sims;
        self
    }

    /// Checks that the config describes at least one run of a valid length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sim_length.is_negative() {
            return Err(ConfigError::NegativeLength(self.sim_length));
        }
        if self.num_sims == 0 {
            return Err(ConfigError::NoSimulations);
        }
        Ok(())
    }

    /// Parses and validates a JSON config.
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::Time;
    /// # use evsim_run::SimConfig;
    /// let config = SimConfig::from_json(r#"{ "randomSeed": 7, "simLength": 1000 }"#)?;
    ///
    /// assert_eq!(config, SimConfig::new(7, Time::of(1000)));
    /// # Ok::<(), evsim_run::ConfigError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

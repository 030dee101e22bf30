use crate::error::PayoffError;
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

/// Absolute tolerance for value ties and for probability sums reaching 1.
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// What a decision node does with its edge probabilities when none of its children has a value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionFallback {
    /// Keep whatever probabilities the edges already carry.
    #[default]
    PreservePrior,
    /// Mark every outgoing probability as undetermined.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub epsilon: f64,
    pub decision_fallback: DecisionFallback,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            epsilon: DEFAULT_EPSILON,
            decision_fallback: DecisionFallback::default(),
        }
    }
}

impl EngineConfig {
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    pub fn validate(&self) -> Result<(), PayoffError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(PayoffError::Config(format!(
                "epsilon must be a finite, non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<EngineConfig, PayoffError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<EngineConfig, PayoffError> {
        tracing::debug!("Reading engine config from: {:?}", path.as_ref());
        let content = read_to_string(path)?;
        EngineConfig::from_toml_str(&content)
    }

    pub fn to_toml_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PayoffError> {
        tracing::debug!("Writing engine config to: {:?}", path.as_ref());
        write(path, toml::to_string(self)?)?;
        Ok(())
    }
}

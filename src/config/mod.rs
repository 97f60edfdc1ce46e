#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliCommand, CliConfig};

use crate::core::engine::DEFAULT_MAX_CONFLICT_RETRIES;
use crate::domain::model::{IncubatorId, DEFAULT_INCUBATOR_ID};
use crate::domain::scheduler::{RotationMode, RotationScheduler};
use crate::utils::error::{IncubatorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_EGG_AMOUNT: u32 = 1;
pub const MAX_EGG_AMOUNT: u32 = 20;
pub const MIN_ROTATION_AMOUNT: f64 = 0.0;
pub const MAX_ROTATION_AMOUNT: f64 = 1.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncubatorConfig {
    pub incubator: IncubatorSection,
    pub limits: LimitsConfig,
    pub rotation: RotationConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IncubatorSection {
    pub default_id: String,
}

impl Default for IncubatorSection {
    fn default() -> Self {
        Self {
            default_id: DEFAULT_INCUBATOR_ID.to_string(),
        }
    }
}

/// Inclusive creation limits enforced by the request validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub min_egg_amount: u32,
    pub max_egg_amount: u32,
    pub min_rotation_amount: f64,
    pub max_rotation_amount: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_egg_amount: MIN_EGG_AMOUNT,
            max_egg_amount: MAX_EGG_AMOUNT,
            min_rotation_amount: MIN_ROTATION_AMOUNT,
            max_rotation_amount: MAX_ROTATION_AMOUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub mode: RotationMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Local,
    S3,
}

impl FromStr for StoreBackend {
    type Err = IncubatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "local" | "file" => Ok(StoreBackend::Local),
            "s3" => Ok(StoreBackend::S3),
            other => Err(IncubatorError::InvalidConfigValueError {
                field: "store.backend".to_string(),
                value: other.to_string(),
                reason: "Valid backends: memory, local, s3".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: String,
    pub bucket: Option<String>,
    pub prefix: String,
    pub region: String,
    pub max_conflict_retries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            path: "./incubators".to_string(),
            bucket: None,
            prefix: "incubators".to_string(),
            region: "ap-southeast-2".to_string(),
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

impl IncubatorConfig {
    pub fn default_incubator_id(&self) -> Result<IncubatorId> {
        IncubatorId::new(self.incubator.default_id.clone())
    }

    pub fn scheduler(&self) -> RotationScheduler {
        RotationScheduler::new(self.rotation.mode)
    }
}

impl Validate for LimitsConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_range(
            "limits.min_egg_amount",
            self.min_egg_amount,
            0,
            self.max_egg_amount,
        )?;
        validation::validate_range("limits.max_egg_amount", self.max_egg_amount, 1, 10_000)?;

        if !self.min_rotation_amount.is_finite() || !self.max_rotation_amount.is_finite() {
            return Err(IncubatorError::ConfigValidationError {
                field: "limits".to_string(),
                message: "Rotation limits must be finite numbers".to_string(),
            });
        }
        validation::validate_range(
            "limits.max_rotation_amount",
            self.max_rotation_amount,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        validation::validate_range(
            "limits.min_rotation_amount",
            self.min_rotation_amount,
            0.0,
            self.max_rotation_amount,
        )?;
        Ok(())
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        match self.backend {
            StoreBackend::Memory => {}
            StoreBackend::Local => validation::validate_path("store.path", &self.path)?,
            StoreBackend::S3 => {
                let bucket = validation::validate_required_field("store.bucket", &self.bucket)?;
                validation::validate_non_empty_string("store.bucket", bucket)?;
                validation::validate_non_empty_string("store.region", &self.region)?;
            }
        }
        validation::validate_range(
            "store.max_conflict_retries",
            self.max_conflict_retries,
            0,
            100,
        )?;
        Ok(())
    }
}

impl Validate for IncubatorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_identifier("incubator.default_id", &self.incubator.default_id)?;
        self.limits.validate()?;
        self.store.validate()?;

        tracing::debug!("✅ Incubator configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = IncubatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_egg_amount, 20);
        assert_eq!(config.store.backend, StoreBackend::Local);
        assert_eq!(config.default_incubator_id().unwrap().as_str(), "default");
    }

    #[test]
    fn test_inverted_egg_limits_are_rejected() {
        let mut config = IncubatorConfig::default();
        config.limits.min_egg_amount = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rotation_limit_above_one_is_rejected() {
        let mut config = IncubatorConfig::default();
        config.limits.max_rotation_amount = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let mut config = IncubatorConfig::default();
        config.store.backend = StoreBackend::S3;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, IncubatorError::MissingConfigError { .. }));

        config.store.bucket = Some("egg-state".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("S3".parse::<StoreBackend>().unwrap(), StoreBackend::S3);
        assert_eq!("file".parse::<StoreBackend>().unwrap(), StoreBackend::Local);
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}

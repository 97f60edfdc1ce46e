use crate::config::{IncubatorConfig, StoreBackend};
use crate::utils::error::{IncubatorError, Result};
use crate::utils::validation::Validate;
use std::env;
use std::str::FromStr;

/// Lambda settings: an optional TOML file (`INCUBATOR_CONFIG`) overlaid with
/// environment variables. The backend is always S3.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub incubator: IncubatorConfig,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("INCUBATOR_CONFIG") {
            Some(path) => IncubatorConfig::from_file(path)?,
            None => IncubatorConfig::default(),
        };

        config.store.backend = StoreBackend::S3;
        if let Some(bucket) = lookup("INCUBATOR_BUCKET").or_else(|| lookup("S3_BUCKET")) {
            config.store.bucket = Some(bucket);
        }
        if config.store.bucket.is_none() {
            return Err(IncubatorError::ConfigError {
                message: "INCUBATOR_BUCKET (or S3_BUCKET) environment variable is required"
                    .to_string(),
            });
        }
        if let Some(prefix) = lookup("S3_PREFIX") {
            config.store.prefix = prefix;
        }
        if let Some(region) = lookup("S3_REGION") {
            config.store.region = region;
        }
        if let Some(id) = lookup("INCUBATOR_ID") {
            config.incubator.default_id = id;
        }
        if let Some(mode) = lookup("ROTATION_MODE") {
            config.rotation.mode = mode.parse()?;
        }

        override_number(&lookup, "MIN_EGG_AMOUNT", &mut config.limits.min_egg_amount)?;
        override_number(&lookup, "MAX_EGG_AMOUNT", &mut config.limits.max_egg_amount)?;
        override_number(&lookup, "MIN_ROTATION_AMOUNT", &mut config.limits.min_rotation_amount)?;
        override_number(&lookup, "MAX_ROTATION_AMOUNT", &mut config.limits.max_rotation_amount)?;
        override_number(&lookup, "MAX_CONFLICT_RETRIES", &mut config.store.max_conflict_retries)?;

        Ok(Self { incubator: config })
    }
}

fn override_number<F, T>(lookup: &F, name: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(name) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| IncubatorError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "Value is not a valid number".to_string(),
            })?;
    }
    Ok(())
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.incubator.validate()?;
        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

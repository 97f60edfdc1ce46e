//! Creation request parsing.
//!
//! Checks run in a fixed order and the first failure wins: egg number,
//! sequence, rotation amount. Sequence entries are only checked for being
//! integers here; their range against the egg count is enforced when the
//! incubator is built.

use crate::config::LimitsConfig;
use crate::core::IncubatorSettings;
use crate::utils::error::{IncubatorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a putSettings request. Numbers may arrive as JSON numbers or as
/// numeric strings, so every field stays loosely typed until validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiInput {
    #[serde(default)]
    pub number_of_eggs: Option<Value>,
    #[serde(default)]
    pub sequence: Option<Value>,
    #[serde(default)]
    pub rotation_amount: Option<Value>,
}

impl ApiInput {
    pub fn new(
        number_of_eggs: impl Into<Value>,
        sequence: impl Into<Value>,
        rotation_amount: impl Into<Value>,
    ) -> Self {
        Self {
            number_of_eggs: Some(number_of_eggs.into()),
            sequence: Some(sequence.into()),
            rotation_amount: Some(rotation_amount.into()),
        }
    }

    pub fn from_body(body: Option<&str>) -> Result<Self> {
        let body = body
            .map(str::trim)
            .filter(|body| !body.is_empty())
            .ok_or_else(|| IncubatorError::InvalidRequest {
                message: "request body is empty".to_string(),
            })?;

        let value: Value = serde_json::from_str(body).map_err(|e| IncubatorError::InvalidRequest {
            message: format!("body is not valid JSON: {}", e),
        })?;
        if !value.is_object() {
            return Err(IncubatorError::InvalidRequest {
                message: "body must be a JSON object".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| IncubatorError::InvalidRequest {
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestValidator {
    limits: LimitsConfig,
}

impl RequestValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn validate(&self, input: &ApiInput) -> Result<IncubatorSettings> {
        let number_of_eggs = self.validate_egg_number(input.number_of_eggs.as_ref())?;
        let sequence = validate_sequence(input.sequence.as_ref())?;
        let rotation = self.validate_rotation(input.rotation_amount.as_ref())?;

        Ok(IncubatorSettings {
            number_of_eggs,
            sequence,
            rotation,
        })
    }

    fn validate_egg_number(&self, raw: Option<&Value>) -> Result<u32> {
        let invalid = || IncubatorError::InvalidEggNumber {
            value: describe(raw),
        };

        let amount = raw.and_then(as_number).ok_or_else(invalid)?;
        if amount.fract() != 0.0
            || amount < f64::from(self.limits.min_egg_amount)
            || amount > f64::from(self.limits.max_egg_amount)
        {
            tracing::warn!(
                "Rejected number_of_eggs {} (allowed {}..={})",
                describe(raw),
                self.limits.min_egg_amount,
                self.limits.max_egg_amount
            );
            return Err(invalid());
        }
        Ok(amount as u32)
    }

    fn validate_rotation(&self, raw: Option<&Value>) -> Result<f64> {
        let invalid = || IncubatorError::InvalidRotationAmount {
            value: describe(raw),
        };

        let rotation = raw.and_then(as_number).ok_or_else(invalid)?;
        // 0 不會轉動任何蛋，即使下限設為 0 也拒絕
        if rotation == 0.0
            || rotation < self.limits.min_rotation_amount
            || rotation > self.limits.max_rotation_amount
        {
            tracing::warn!(
                "Rejected rotation_amount {} (allowed ({}..={}])",
                describe(raw),
                self.limits.min_rotation_amount,
                self.limits.max_rotation_amount
            );
            return Err(invalid());
        }
        Ok(rotation)
    }
}

fn validate_sequence(raw: Option<&Value>) -> Result<Vec<i64>> {
    let invalid = |token: &str| IncubatorError::InvalidSequence {
        reason: format!("'{}' is not an integer", token),
    };

    match raw {
        Some(Value::String(text)) => text
            .split_whitespace()
            .map(|token| parse_integer(token).ok_or_else(|| invalid(token)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                as_number(item)
                    .and_then(integral)
                    .ok_or_else(|| invalid(&item.to_string()))
            })
            .collect(),
        Some(other) => Err(invalid(&other.to_string())),
        None => Err(IncubatorError::InvalidSequence {
            reason: "sequence is required".to_string(),
        }),
    }
}

fn parse_integer(token: &str) -> Option<i64> {
    token
        .parse::<i64>()
        .ok()
        .or_else(|| token.parse::<f64>().ok().and_then(integral))
}

fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn describe(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(text)) => text.clone(),
        Some(value) => value.to_string(),
        None => "<missing>".to_string(),
    }
}

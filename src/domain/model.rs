use crate::utils::error::{IncubatorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_INCUBATOR_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncubatorId(String);

impl IncubatorId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        crate::utils::validation::validate_identifier("incubator_id", &id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IncubatorId {
    fn default() -> Self {
        Self(DEFAULT_INCUBATOR_ID.to_string())
    }
}

impl fmt::Display for IncubatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creation input that already passed request validation.
#[derive(Debug, Clone, PartialEq)]
pub struct IncubatorSettings {
    pub number_of_eggs: u32,
    pub sequence: Vec<i64>,
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Egg {
    pub id: u32,
    pub rotated: bool,
}

/// One incubator: its eggs, the circular visiting order and the per-run
/// fraction of that order. Only constructed through [`Incubator::new`] or a
/// deserialization that re-checks the same invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IncubatorParts")]
pub struct Incubator {
    eggs: Vec<Egg>,
    sequence: Vec<u32>,
    rotation: f64,
    cursor: usize,
    runs: u64,
}

#[derive(Deserialize)]
struct IncubatorParts {
    eggs: Vec<Egg>,
    sequence: Vec<u32>,
    rotation: f64,
    #[serde(default)]
    cursor: usize,
    #[serde(default)]
    runs: u64,
}

impl TryFrom<IncubatorParts> for Incubator {
    type Error = IncubatorError;

    fn try_from(parts: IncubatorParts) -> Result<Self> {
        let incubator = Incubator {
            eggs: parts.eggs,
            sequence: parts.sequence,
            rotation: parts.rotation,
            cursor: parts.cursor,
            runs: parts.runs,
        };
        incubator.check_invariants()?;
        Ok(incubator)
    }
}

impl Incubator {
    /// Fresh incubator: ids `0..number_of_eggs`, nothing rotated, cursor at
    /// the start of `sequence`.
    pub fn new(number_of_eggs: u32, sequence: Vec<i64>, rotation: f64) -> Result<Self> {
        if !rotation.is_finite() || rotation <= 0.0 || rotation > 1.0 {
            return Err(IncubatorError::InvalidRotationAmount {
                value: rotation.to_string(),
            });
        }

        let sequence = sequence
            .into_iter()
            .map(|entry| match u32::try_from(entry) {
                Ok(id) if id < number_of_eggs => Ok(id),
                _ => Err(IncubatorError::InvalidSequence {
                    reason: format!(
                        "egg {} is outside the egg range 0..{}",
                        entry, number_of_eggs
                    ),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        let eggs = (0..number_of_eggs)
            .map(|id| Egg { id, rotated: false })
            .collect();

        Ok(Self {
            eggs,
            sequence,
            rotation,
            cursor: 0,
            runs: 0,
        })
    }

    pub fn from_settings(settings: IncubatorSettings) -> Result<Self> {
        Self::new(settings.number_of_eggs, settings.sequence, settings.rotation)
    }

    pub fn eggs(&self) -> &[Egg] {
        &self.eggs
    }

    pub fn number_of_eggs(&self) -> usize {
        self.eggs.len()
    }

    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn rotated_eggs(&self) -> impl Iterator<Item = u32> + '_ {
        self.eggs.iter().filter(|egg| egg.rotated).map(|egg| egg.id)
    }

    pub(crate) fn mark_rotated(&mut self, egg_id: u32) {
        // sequence 已在建立時檢查範圍
        if let Some(egg) = self.eggs.get_mut(egg_id as usize) {
            egg.rotated = true;
        }
    }

    pub(crate) fn clear_rotations(&mut self) {
        for egg in &mut self.eggs {
            egg.rotated = false;
        }
    }

    pub(crate) fn finish_run(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.runs += 1;
    }

    fn check_invariants(&self) -> Result<()> {
        if let Some((index, egg)) = self
            .eggs
            .iter()
            .enumerate()
            .find(|(index, egg)| egg.id as usize != *index)
        {
            return Err(IncubatorError::StorageError {
                message: format!("egg at position {} has id {}", index, egg.id),
            });
        }

        if let Some(entry) = self
            .sequence
            .iter()
            .find(|entry| **entry as usize >= self.eggs.len())
        {
            return Err(IncubatorError::StorageError {
                message: format!(
                    "sequence entry {} is outside the egg range 0..{}",
                    entry,
                    self.eggs.len()
                ),
            });
        }

        if !self.rotation.is_finite() || self.rotation <= 0.0 || self.rotation > 1.0 {
            return Err(IncubatorError::StorageError {
                message: format!("rotation {} is outside (0, 1]", self.rotation),
            });
        }

        let cursor_ok = if self.sequence.is_empty() {
            self.cursor == 0
        } else {
            self.cursor < self.sequence.len()
        };
        if !cursor_ok {
            return Err(IncubatorError::StorageError {
                message: format!(
                    "cursor {} is outside a sequence of length {}",
                    self.cursor,
                    self.sequence.len()
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_incubator_has_unrotated_eggs_in_order() {
        let incubator = Incubator::new(4, vec![0, 1, 2, 3], 1.0).unwrap();

        assert_eq!(incubator.number_of_eggs(), 4);
        let ids: Vec<u32> = incubator.eggs().iter().map(|egg| egg.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(incubator.eggs().iter().all(|egg| !egg.rotated));
        assert_eq!(incubator.cursor(), 0);
        assert_eq!(incubator.runs(), 0);
    }

    #[test]
    fn test_sequence_keeps_insertion_order_and_duplicates() {
        let incubator = Incubator::new(3, vec![2, 0, 2, 1], 0.5).unwrap();
        assert_eq!(incubator.sequence(), &[2, 0, 2, 1]);
    }

    #[test]
    fn test_sequence_outside_egg_range_is_rejected() {
        let err = Incubator::new(3, vec![0, 3], 1.0).unwrap_err();
        assert!(matches!(err, IncubatorError::InvalidSequence { .. }));

        let err = Incubator::new(3, vec![-1], 1.0).unwrap_err();
        assert!(matches!(err, IncubatorError::InvalidSequence { .. }));
    }

    #[test]
    fn test_rotation_outside_unit_interval_is_rejected() {
        for rotation in [0.0, -0.5, 1.000_001, 2.0, 1e300, f64::NAN, f64::INFINITY] {
            let err = Incubator::new(3, vec![0], rotation).unwrap_err();
            assert!(matches!(err, IncubatorError::InvalidRotationAmount { .. }));
        }
    }

    #[test]
    fn test_deserialize_rechecks_invariants() {
        let incubator = Incubator::new(2, vec![1, 0], 0.5).unwrap();
        let json = serde_json::to_string(&incubator).unwrap();
        let restored: Incubator = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, incubator);

        let broken = r#"{"eggs":[{"id":0,"rotated":false}],"sequence":[4],"rotation":1.0}"#;
        assert!(serde_json::from_str::<Incubator>(broken).is_err());

        let bad_cursor =
            r#"{"eggs":[{"id":0,"rotated":false}],"sequence":[0],"rotation":1.0,"cursor":1}"#;
        assert!(serde_json::from_str::<Incubator>(bad_cursor).is_err());
    }

    #[test]
    fn test_deserialize_rejects_rotation_above_one() {
        let oversized = r#"{"eggs":[{"id":0,"rotated":false},{"id":1,"rotated":false}],
            "sequence":[0,1],"rotation":1e300}"#;
        let err = serde_json::from_str::<Incubator>(oversized).unwrap_err();
        assert!(err.to_string().contains("outside (0, 1]"));

        let full = r#"{"eggs":[{"id":0,"rotated":false}],"sequence":[0],"rotation":1.0}"#;
        assert!(serde_json::from_str::<Incubator>(full).is_ok());
    }

    #[test]
    fn test_incubator_id_rejects_path_characters() {
        assert!(IncubatorId::new("coop-1").is_ok());
        assert!(IncubatorId::new("coop/1").is_err());
        assert_eq!(IncubatorId::default().as_str(), DEFAULT_INCUBATOR_ID);
    }
}

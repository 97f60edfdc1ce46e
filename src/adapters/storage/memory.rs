use crate::core::{Incubator, IncubatorId, IncubatorStore, Precondition, Version, Versioned};
use crate::utils::error::{IncubatorError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct MemoryIncubatorStore {
    incubators: Arc<Mutex<HashMap<IncubatorId, (Incubator, u64)>>>,
}

impl MemoryIncubatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.incubators.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.incubators.lock().await.is_empty()
    }
}

impl IncubatorStore for MemoryIncubatorStore {
    async fn load(&self, id: &IncubatorId) -> Result<Option<Versioned<Incubator>>> {
        let incubators = self.incubators.lock().await;
        Ok(incubators
            .get(id)
            .map(|(incubator, revision)| Versioned {
                value: incubator.clone(),
                version: Version::from_revision(*revision),
            }))
    }

    async fn save(
        &self,
        id: &IncubatorId,
        incubator: &Incubator,
        precondition: Precondition,
    ) -> Result<Version> {
        let mut incubators = self.incubators.lock().await;
        let stored_revision = incubators.get(id).map(|(_, revision)| *revision);

        let accepted = match (&precondition, stored_revision) {
            (Precondition::Any, _) => true,
            (Precondition::Absent, stored) => stored.is_none(),
            (Precondition::Matches(expected), Some(stored)) => {
                expected.revision() == Some(stored)
            }
            (Precondition::Matches(_), None) => false,
        };
        if !accepted {
            return Err(IncubatorError::StoreConflict { id: id.to_string() });
        }

        let revision = stored_revision.unwrap_or(0) + 1;
        incubators.insert(id.clone(), (incubator.clone(), revision));
        Ok(Version::from_revision(revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let store = MemoryIncubatorStore::new();
        assert!(store.load(&IncubatorId::default()).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let store = MemoryIncubatorStore::new();
        let id = IncubatorId::default();
        let incubator = Incubator::new(2, vec![0, 1], 1.0).unwrap();

        let first = store.save(&id, &incubator, Precondition::Any).await.unwrap();
        let second = store
            .save(&id, &incubator, Precondition::Matches(first.clone()))
            .await
            .unwrap();
        assert_ne!(first, second);

        let err = store
            .save(&id, &incubator, Precondition::Matches(first))
            .await
            .unwrap_err();
        assert!(matches!(err, IncubatorError::StoreConflict { .. }));

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.version, second);
    }

    #[tokio::test]
    async fn test_absent_precondition() {
        let store = MemoryIncubatorStore::new();
        let id = IncubatorId::default();
        let incubator = Incubator::new(1, vec![0], 1.0).unwrap();

        store
            .save(&id, &incubator, Precondition::Absent)
            .await
            .unwrap();
        let err = store
            .save(&id, &incubator, Precondition::Absent)
            .await
            .unwrap_err();
        assert!(matches!(err, IncubatorError::StoreConflict { .. }));
        assert_eq!(store.len().await, 1);
    }
}

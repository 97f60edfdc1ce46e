use crate::core::{Incubator, IncubatorId, IncubatorSettings, IncubatorStore, Precondition};
use crate::domain::scheduler::RotationScheduler;
use crate::utils::error::{IncubatorError, Result};

pub const DEFAULT_MAX_CONFLICT_RETRIES: usize = 5;

pub struct IncubatorEngine<S: IncubatorStore> {
    store: S,
    scheduler: RotationScheduler,
    max_conflict_retries: usize,
}

impl<S: IncubatorStore> IncubatorEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_scheduler(store, RotationScheduler::default())
    }

    pub fn with_scheduler(store: S, scheduler: RotationScheduler) -> Self {
        Self {
            store,
            scheduler,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    pub fn max_conflict_retries(mut self, retries: usize) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    /// Builds a fresh incubator and replaces whatever was stored under `id`.
    pub async fn create_incubator(
        &self,
        id: &IncubatorId,
        settings: IncubatorSettings,
    ) -> Result<Incubator> {
        let incubator = Incubator::from_settings(settings)?;
        let version = self.store.save(id, &incubator, Precondition::Any).await?;

        tracing::info!(
            "Incubator '{}' configured with {} eggs, sequence length {}, rotation {} (version {})",
            id,
            incubator.number_of_eggs(),
            incubator.sequence().len(),
            incubator.rotation(),
            version
        );

        Ok(incubator)
    }

    /// One rotation cycle. The successor only commits against the version
    /// it was computed from; on conflict the run restarts from a fresh load.
    pub async fn port_run(&self, id: &IncubatorId) -> Result<Incubator> {
        let attempts = self.max_conflict_retries + 1;

        for attempt in 1..=attempts {
            let current = self
                .store
                .load(id)
                .await?
                .ok_or_else(|| IncubatorError::IncubatorNotExist { id: id.to_string() })?;

            let next = self.scheduler.next_state(&current.value);

            match self
                .store
                .save(id, &next, Precondition::Matches(current.version.clone()))
                .await
            {
                Ok(version) => {
                    tracing::info!(
                        "Port run {} on incubator '{}' rotated {} of {} eggs (version {} -> {})",
                        next.runs(),
                        id,
                        next.rotated_eggs().count(),
                        next.number_of_eggs(),
                        current.version,
                        version
                    );
                    return Ok(next);
                }
                Err(IncubatorError::StoreConflict { .. }) => {
                    tracing::warn!(
                        "Port run on incubator '{}' lost a version race (attempt {}/{})",
                        id,
                        attempt,
                        attempts
                    );
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(IncubatorError::ConcurrentModification {
            id: id.to_string(),
            attempts,
        })
    }

    pub async fn current(&self, id: &IncubatorId) -> Result<Option<Incubator>> {
        Ok(self.store.load(id).await?.map(|stored| stored.value))
    }
}

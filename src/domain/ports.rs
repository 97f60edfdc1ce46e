use crate::domain::model::{Incubator, IncubatorId};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying one committed state of an incubator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Counter-based stores keep a monotonically increasing revision.
    pub fn from_revision(revision: u64) -> Self {
        Self(revision.to_string())
    }

    pub fn revision(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

/// Condition a save must satisfy to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Overwrite whatever is stored.
    Any,
    /// Only commit when nothing is stored under the id yet.
    Absent,
    /// Only commit when the stored state still carries this version.
    Matches(Version),
}

/// Persistence for incubators keyed by id. A failed precondition must
/// surface as `IncubatorError::StoreConflict` and leave the stored state
/// untouched.
pub trait IncubatorStore: Send + Sync {
    fn load(
        &self,
        id: &IncubatorId,
    ) -> impl std::future::Future<Output = Result<Option<Versioned<Incubator>>>> + Send;

    fn save(
        &self,
        id: &IncubatorId,
        incubator: &Incubator,
        precondition: Precondition,
    ) -> impl std::future::Future<Output = Result<Version>> + Send;
}

//! Storage backends for [`IncubatorStore`](crate::core::IncubatorStore).

pub mod local;
pub mod memory;
#[cfg(feature = "lambda")]
pub mod s3;

pub use local::LocalIncubatorStore;
pub use memory::MemoryIncubatorStore;
#[cfg(feature = "lambda")]
pub use s3::S3IncubatorStore;

use crate::core::Incubator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk / on-bucket JSON document for one incubator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
    pub incubator: Incubator,
}

impl StoredDocument {
    pub fn new(revision: u64, incubator: Incubator) -> Self {
        Self {
            revision,
            updated_at: Utc::now(),
            incubator,
        }
    }
}

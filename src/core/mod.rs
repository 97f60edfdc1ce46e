pub mod engine;

pub use crate::domain::model::{Egg, Incubator, IncubatorId, IncubatorSettings};
pub use crate::domain::ports::{IncubatorStore, Precondition, Version, Versioned};
pub use crate::utils::error::Result;

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;
#[cfg(feature = "lambda")]
pub use adapters::storage::S3IncubatorStore;

pub use adapters::storage::{LocalIncubatorStore, MemoryIncubatorStore};
pub use app::{ApiHandler, ApiInput, ApiRequest, ApiResponse, IncubatorController, RequestValidator};
pub use config::IncubatorConfig;
pub use core::engine::IncubatorEngine;
pub use domain::model::{Egg, Incubator, IncubatorId};
pub use domain::scheduler::{RotationMode, RotationScheduler};
pub use utils::error::{IncubatorError, Result};

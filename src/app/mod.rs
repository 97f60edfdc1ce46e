// Request adapter layer: parses requests, calls the engine and shapes responses.
// Knows nothing about rotation rules.

pub mod controller;
pub mod report;
pub mod response;
pub mod validator;

pub use controller::{ApiHandler, ApiRequest, IncubatorController, Route};
pub use report::{ApiResult, EggRotation, IncubatorReport};
pub use response::{ApiResponse, ResponseBuilder};
pub use validator::{ApiInput, RequestValidator};

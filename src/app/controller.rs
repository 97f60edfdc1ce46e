use crate::app::report::ApiResult;
use crate::app::response::{ApiResponse, ResponseBuilder};
use crate::app::validator::{ApiInput, RequestValidator};
use crate::core::engine::IncubatorEngine;
use crate::core::{IncubatorId, IncubatorStore};
use crate::utils::error::{IncubatorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const INCUBATOR_ID_PARAM: &str = "incubator_id";

/// API Gateway proxy request; only the fields the routes read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl ApiRequest {
    pub fn new(http_method: &str, path: &str, body: Option<String>) -> Self {
        Self {
            http_method: http_method.to_string(),
            path: path.to_string(),
            body,
            ..Self::default()
        }
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .or_else(|| {
                self.query_string_parameters
                    .as_ref()
                    .and_then(|params| params.get(name))
            })
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    PutSettings,
    GetSettings,
    PortRun,
}

impl Route {
    /// Matches on the last path segment so stage or resource prefixes
    /// (`/prod/incubators/{id}/port-run`) route the same way.
    pub fn resolve(method: &str, path: &str) -> Option<Self> {
        let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        match (method.to_ascii_uppercase().as_str(), segment) {
            ("PUT" | "POST", "settings" | "putSettings") => Some(Route::PutSettings),
            ("GET", "settings") => Some(Route::GetSettings),
            ("POST" | "GET", "port-run" | "portRun") => Some(Route::PortRun),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ApiHandler: Send + Sync {
    async fn handle(&self, request: ApiRequest) -> ApiResponse;
}

pub struct IncubatorController<S: IncubatorStore> {
    engine: IncubatorEngine<S>,
    validator: RequestValidator,
    default_id: IncubatorId,
}

impl<S: IncubatorStore> IncubatorController<S> {
    pub fn new(
        engine: IncubatorEngine<S>,
        validator: RequestValidator,
        default_id: IncubatorId,
    ) -> Self {
        Self {
            engine,
            validator,
            default_id,
        }
    }

    pub fn engine(&self) -> &IncubatorEngine<S> {
        &self.engine
    }

    pub fn default_id(&self) -> &IncubatorId {
        &self.default_id
    }

    /// Validates the creation input and replaces the incubator under `id`.
    pub async fn put_settings(&self, id: &IncubatorId, input: &ApiInput) -> Result<ApiResult> {
        let settings = self.validator.validate(input)?;
        let incubator = self.engine.create_incubator(id, settings).await?;
        Ok(ApiResult::from(&incubator))
    }

    pub async fn port_run(&self, id: &IncubatorId) -> Result<ApiResult> {
        let incubator = self.engine.port_run(id).await?;
        Ok(ApiResult::from(&incubator))
    }

    pub async fn get_settings(&self, id: &IncubatorId) -> Result<ApiResult> {
        let incubator = self
            .engine
            .current(id)
            .await?
            .ok_or_else(|| IncubatorError::IncubatorNotExist { id: id.to_string() })?;
        Ok(ApiResult::from(&incubator))
    }

    fn resolve_id(&self, request: &ApiRequest) -> Result<IncubatorId> {
        match request.parameter(INCUBATOR_ID_PARAM) {
            Some(raw) => IncubatorId::new(raw).map_err(|_| IncubatorError::InvalidRequest {
                message: format!("'{}' is not a valid incubator id", raw),
            }),
            None => Ok(self.default_id.clone()),
        }
    }

    async fn dispatch(&self, route: Route, request: &ApiRequest) -> Result<ApiResult> {
        let id = self.resolve_id(request)?;
        match route {
            Route::PutSettings => {
                if request.is_base64_encoded {
                    return Err(IncubatorError::InvalidRequest {
                        message: "base64 encoded bodies are not supported".to_string(),
                    });
                }
                let input = ApiInput::from_body(request.body.as_deref())?;
                self.put_settings(&id, &input).await
            }
            Route::GetSettings => self.get_settings(&id).await,
            Route::PortRun => self.port_run(&id).await,
        }
    }
}

#[async_trait]
impl<S: IncubatorStore> ApiHandler for IncubatorController<S> {
    async fn handle(&self, request: ApiRequest) -> ApiResponse {
        let Some(route) = Route::resolve(&request.http_method, &request.path) else {
            tracing::warn!("No route for {} {}", request.http_method, request.path);
            return ResponseBuilder::not_found(
                "ROUTE_NOT_FOUND",
                &format!("No route for {} {}", request.http_method, request.path),
            );
        };

        tracing::debug!("Dispatching {} {} as {:?}", request.http_method, request.path, route);
        match self.dispatch(route, &request).await {
            Ok(result) => ResponseBuilder::ok(&result),
            Err(e) => ResponseBuilder::from_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryIncubatorStore;

    fn controller() -> IncubatorController<MemoryIncubatorStore> {
        IncubatorController::new(
            IncubatorEngine::new(MemoryIncubatorStore::new()),
            RequestValidator::default(),
            IncubatorId::default(),
        )
    }

    #[test]
    fn test_route_resolution() {
        assert_eq!(Route::resolve("PUT", "/settings"), Some(Route::PutSettings));
        assert_eq!(Route::resolve("post", "/dev/putSettings/"), Some(Route::PutSettings));
        assert_eq!(Route::resolve("GET", "/settings"), Some(Route::GetSettings));
        assert_eq!(
            Route::resolve("POST", "/prod/incubators/barn/port-run"),
            Some(Route::PortRun)
        );
        assert_eq!(Route::resolve("DELETE", "/settings"), None);
        assert_eq!(Route::resolve("GET", "/"), None);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = controller()
            .handle(ApiRequest::new("GET", "/eggs", None))
            .await;
        assert_eq!(response.status_code, 404);
        assert!(response.body.contains("ROUTE_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_incubator_id_from_path_parameters() {
        let controller = controller();
        let mut request = ApiRequest::new(
            "PUT",
            "/incubators/barn/settings",
            Some(r#"{"number_of_eggs": 2, "sequence": "1 0", "rotation_amount": 0.5}"#.to_string()),
        );
        request.path_parameters = Some(HashMap::from([(
            INCUBATOR_ID_PARAM.to_string(),
            "barn".to_string(),
        )]));

        let response = controller.handle(request).await;
        assert_eq!(response.status_code, 200);

        let barn = IncubatorId::new("barn").unwrap();
        assert!(controller.engine().current(&barn).await.unwrap().is_some());
        assert!(controller
            .engine()
            .current(controller.default_id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_incubator_id_is_rejected() {
        let mut request = ApiRequest::new("POST", "/port-run", None);
        request.query_string_parameters = Some(HashMap::from([(
            INCUBATOR_ID_PARAM.to_string(),
            "../../etc".to_string(),
        )]));

        let response = controller().handle(request).await;
        assert_eq!(response.status_code, 400);
        assert!(response.body.contains("INVALID_REQUEST"));
    }

    #[tokio::test]
    async fn test_base64_body_is_rejected() {
        let mut request = ApiRequest::new("PUT", "/settings", Some("e30=".to_string()));
        request.is_base64_encoded = true;

        let response = controller().handle(request).await;
        assert_eq!(response.status_code, 400);
    }
}

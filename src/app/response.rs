use crate::utils::error::IncubatorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// API Gateway proxy response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn ok<T: Serialize>(result: &T) -> ApiResponse {
        match serde_json::to_string(result) {
            Ok(body) => Self::json(200, body),
            Err(e) => {
                tracing::error!("❌ Failed to serialize response: {}", e);
                Self::internal_server_error("SERIALIZATION_ERROR", "Response could not be encoded")
            }
        }
    }

    pub fn bad_request(code: &str, message: &str) -> ApiResponse {
        Self::error(400, code, message)
    }

    pub fn not_found(code: &str, message: &str) -> ApiResponse {
        Self::error(404, code, message)
    }

    pub fn internal_server_error(code: &str, message: &str) -> ApiResponse {
        Self::error(500, code, message)
    }

    /// 請求錯誤回 400，其餘回 500 並記錄
    pub fn from_error(error: &IncubatorError) -> ApiResponse {
        if error.is_rejection() {
            tracing::warn!("Request rejected: {}", error);
            Self::bad_request(error.error_code(), &error.user_friendly_message())
        } else {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                error,
                error.category(),
                error.severity()
            );
            Self::internal_server_error(error.error_code(), &error.user_friendly_message())
        }
    }

    fn error(status_code: u16, code: &str, message: &str) -> ApiResponse {
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            },
        };
        // ErrorBody 只有字串欄位，序列化不會失敗
        let body = serde_json::to_string(&body).unwrap_or_default();
        Self::json(status_code, body)
    }

    fn json(status_code: u16, body: String) -> ApiResponse {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        ApiResponse {
            status_code,
            headers,
            body,
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IncubatorError {
    #[error("Invalid egg number: {value}")]
    InvalidEggNumber { value: String },

    #[error("Invalid sequence: {reason}")]
    InvalidSequence { reason: String },

    #[error("Invalid rotation amount: {value}")]
    InvalidRotationAmount { value: String },

    #[error("Incubator '{id}' does not exist")]
    IncubatorNotExist { id: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Incubator '{id}' was modified by another request")]
    StoreConflict { id: String },

    #[error("Incubator '{id}' is still contended after {attempts} attempts")]
    ConcurrentModification { id: String, attempts: usize },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    State,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncubatorError {
    /// 對外回傳的錯誤代碼
    pub fn error_code(&self) -> &'static str {
        match self {
            IncubatorError::InvalidEggNumber { .. } => "INVALID_EGG_NUMBER",
            IncubatorError::InvalidSequence { .. } => "INVALID_SEQUENCE",
            IncubatorError::InvalidRotationAmount { .. } => "INVALID_ROTATION_AMOUNT",
            IncubatorError::IncubatorNotExist { .. } => "INCUBATOR_NOT_EXIST",
            IncubatorError::InvalidRequest { .. } => "INVALID_REQUEST",
            IncubatorError::StoreConflict { .. } => "STORE_CONFLICT",
            IncubatorError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            IncubatorError::StorageError { .. }
            | IncubatorError::IoError(_)
            | IncubatorError::SerializationError(_) => "STORAGE_ERROR",
            IncubatorError::ConfigError { .. }
            | IncubatorError::ConfigValidationError { .. }
            | IncubatorError::InvalidConfigValueError { .. }
            | IncubatorError::MissingConfigError { .. } => "CONFIG_ERROR",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            IncubatorError::InvalidEggNumber { .. }
            | IncubatorError::InvalidSequence { .. }
            | IncubatorError::InvalidRotationAmount { .. }
            | IncubatorError::InvalidRequest { .. } => ErrorCategory::Request,
            IncubatorError::IncubatorNotExist { .. }
            | IncubatorError::StoreConflict { .. }
            | IncubatorError::ConcurrentModification { .. } => ErrorCategory::State,
            IncubatorError::StorageError { .. }
            | IncubatorError::IoError(_)
            | IncubatorError::SerializationError(_) => ErrorCategory::Storage,
            IncubatorError::ConfigError { .. }
            | IncubatorError::ConfigValidationError { .. }
            | IncubatorError::InvalidConfigValueError { .. }
            | IncubatorError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::High,
            ErrorCategory::State => match self {
                IncubatorError::IncubatorNotExist { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 使用者端錯誤 (4xx)，其餘視為服務端錯誤
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IncubatorError::InvalidEggNumber { .. }
                | IncubatorError::InvalidSequence { .. }
                | IncubatorError::InvalidRotationAmount { .. }
                | IncubatorError::IncubatorNotExist { .. }
                | IncubatorError::InvalidRequest { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IncubatorError::InvalidEggNumber { .. } => {
                "Egg number should be an integer within the configured egg range".to_string()
            }
            IncubatorError::InvalidSequence { .. } => {
                "Sequence should only contain integer and within egg range".to_string()
            }
            IncubatorError::InvalidRotationAmount { .. } => {
                "Rotation amount should be greater than 0 and within the configured range"
                    .to_string()
            }
            IncubatorError::IncubatorNotExist { .. } => {
                "Incubator does not exist, please configure it first".to_string()
            }
            IncubatorError::InvalidRequest { message } => {
                format!("Request could not be understood: {}", message)
            }
            IncubatorError::StoreConflict { .. }
            | IncubatorError::ConcurrentModification { .. } => {
                "Incubator is busy, please try again".to_string()
            }
            IncubatorError::StorageError { .. }
            | IncubatorError::IoError(_)
            | IncubatorError::SerializationError(_) => {
                "Incubator state could not be read or written".to_string()
            }
            _ => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            IncubatorError::InvalidEggNumber { .. } => {
                "Pass an integer number_of_eggs inside the configured limits"
            }
            IncubatorError::InvalidSequence { .. } => {
                "Use space separated egg ids, each lower than number_of_eggs"
            }
            IncubatorError::InvalidRotationAmount { .. } => {
                "Pass a rotation_amount such as 0.25, 0.5 or 1"
            }
            IncubatorError::IncubatorNotExist { .. } => {
                "Create the incubator with putSettings before calling portRun"
            }
            IncubatorError::InvalidRequest { .. } => {
                "Send a JSON object body and a valid incubator id"
            }
            IncubatorError::StoreConflict { .. }
            | IncubatorError::ConcurrentModification { .. } => {
                "Retry the request; another port run was committed first"
            }
            IncubatorError::StorageError { .. }
            | IncubatorError::IoError(_)
            | IncubatorError::SerializationError(_) => {
                "Check the store path or bucket permissions and the stored documents"
            }
            _ => "Review the configuration file and environment variables",
        }
    }
}

pub type Result<T> = std::result::Result<T, IncubatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_rejections() {
        let err = IncubatorError::InvalidSequence {
            reason: "token 'x' is not an integer".to_string(),
        };
        assert!(err.is_rejection());
        assert_eq!(err.error_code(), "INVALID_SEQUENCE");
        assert_eq!(err.category(), ErrorCategory::Request);

        let err = IncubatorError::IncubatorNotExist {
            id: "default".to_string(),
        };
        assert!(err.is_rejection());
        assert_eq!(err.category(), ErrorCategory::State);
    }

    #[test]
    fn test_storage_errors_are_critical() {
        let err = IncubatorError::StorageError {
            message: "bucket missing".to_string(),
        };
        assert!(!err.is_rejection());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Resume data is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("API returned HTTP {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("Unexpected LLM response: {message}")]
    LlmResponseError { message: String },

    #[error("Tool '{tool}' failed: {message}")]
    ToolError { tool: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Agent,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScreenerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScreenerError::HttpError(_) | ScreenerError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            ScreenerError::CsvError(_)
            | ScreenerError::SerializationError(_)
            | ScreenerError::MissingColumn { .. }
            | ScreenerError::ProcessingError { .. } => ErrorCategory::Data,
            ScreenerError::TomlError(_)
            | ScreenerError::ConfigValidationError { .. }
            | ScreenerError::InvalidConfigValueError { .. }
            | ScreenerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScreenerError::LlmResponseError { .. } | ScreenerError::ToolError { .. } => {
                ErrorCategory::Agent
            }
            ScreenerError::ZipError(_) | ScreenerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一工具呼叫失敗只影響該步驟
            ScreenerError::ToolError { .. } => ErrorSeverity::Low,
            ScreenerError::HttpError(_)
            | ScreenerError::ApiStatusError { .. }
            | ScreenerError::LlmResponseError { .. } => ErrorSeverity::Medium,
            ScreenerError::CsvError(_)
            | ScreenerError::SerializationError(_)
            | ScreenerError::MissingColumn { .. }
            | ScreenerError::ProcessingError { .. }
            | ScreenerError::TomlError(_)
            | ScreenerError::ConfigValidationError { .. }
            | ScreenerError::InvalidConfigValueError { .. }
            | ScreenerError::MissingConfigError { .. } => ErrorSeverity::High,
            ScreenerError::ZipError(_) | ScreenerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 建議使用者如何修復
    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScreenerError::HttpError(_) => {
                "Check network connectivity and the LLM endpoint, then retry".to_string()
            }
            ScreenerError::ApiStatusError { status, .. } => match status {
                401 | 403 => "Verify OPENROUTER_API_KEY or llm.api_key".to_string(),
                429 => "Rate limited; wait a moment or reduce max_resumes".to_string(),
                _ => "Retry later; the provider reported an error".to_string(),
            },
            ScreenerError::LlmResponseError { .. } => {
                "Tighten the prompt or output schema so the model returns plain JSON".to_string()
            }
            ScreenerError::ToolError { tool, .. } => {
                format!("Check the arguments passed to '{}'", tool)
            }
            ScreenerError::MissingColumn { column } => {
                format!("Make sure the resume CSV has a '{}' header", column)
            }
            ScreenerError::CsvError(_) => "Check the resume CSV for malformed rows".to_string(),
            ScreenerError::SerializationError(_) | ScreenerError::ProcessingError { .. } => {
                "Inspect the input data; run with --verbose for details".to_string()
            }
            ScreenerError::TomlError(_) => "Fix the TOML syntax in the config file".to_string(),
            ScreenerError::ConfigValidationError { field, .. }
            | ScreenerError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' in your configuration", field)
            }
            ScreenerError::MissingConfigError { field } => {
                format!("Provide '{}' in the config file or on the command line", field)
            }
            ScreenerError::ZipError(_) | ScreenerError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the LLM service: {}", self),
            ErrorCategory::Data => format!("Problem with input data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Agent => format!("Agent step failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let tool = ScreenerError::ToolError {
            tool: "send_email".to_string(),
            message: "missing template".to_string(),
        };
        assert_eq!(tool.exit_code(), 0);

        let api = ScreenerError::ApiStatusError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(api.category(), ErrorCategory::Network);
        assert_eq!(api.exit_code(), 2);

        let config = ScreenerError::MissingConfigError {
            field: "llm.api_key".to_string(),
        };
        assert_eq!(config.exit_code(), 1);

        let io = ScreenerError::IoError(std::io::Error::other("disk full"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn test_auth_failure_suggests_api_key() {
        let err = ScreenerError::ApiStatusError {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(err.recovery_suggestion().contains("OPENROUTER_API_KEY"));
        assert!(err.user_friendly_message().contains("HTTP 401"));
    }
}

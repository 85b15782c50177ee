use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: String },

    #[error("{service} API returned status {status}: {body}")]
    UpstreamStatus {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected {service} response: {message}")]
    UpstreamFormat { service: String, message: String },

    #[error("Cultural insights unavailable: {message}")]
    InsightsUnavailable { message: String },

    #[error("No language model produced a response: {message}")]
    LlmUnavailable { message: String },

    #[error("Chat service unreachable or replied unexpectedly: {message}")]
    TransportError { message: String },

    #[error("Chat service answered {status} ({}): {message}", .error_type.as_str())]
    ServiceError {
        status: u16,
        error_type: ErrorType,
        message: String,
    },
}

/// 對外回傳的錯誤分類，前端依此顯示固定訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    QlooApiError,
    LlmApiError,
    MissingApiKeys,
    OnboardingError,
    InvalidRequest,
    GeneralError,
}

impl ErrorType {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorType::QlooApiError => "I'm having trouble accessing cultural data right now. Please try again in a few moments, or contact support if the issue persists.",
            ErrorType::LlmApiError => "I'm experiencing technical difficulties with my AI processing. Please try again shortly.",
            ErrorType::MissingApiKeys => "The service is not properly configured. Please contact support for assistance.",
            ErrorType::OnboardingError => "I'm having trouble processing your request. Let me try to help you get started anyway.",
            ErrorType::InvalidRequest => "I didn't understand your request format. Please try rephrasing your question.",
            ErrorType::GeneralError => "Something went wrong on my end. Please try again, and if the problem continues, contact support.",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ErrorType::InvalidRequest => 400,
            ErrorType::QlooApiError | ErrorType::LlmApiError | ErrorType::MissingApiKeys => 503,
            ErrorType::OnboardingError | ErrorType::GeneralError => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::QlooApiError => "QLOO_API_ERROR",
            ErrorType::LlmApiError => "LLM_API_ERROR",
            ErrorType::MissingApiKeys => "MISSING_API_KEYS",
            ErrorType::OnboardingError => "ONBOARDING_ERROR",
            ErrorType::InvalidRequest => "INVALID_REQUEST",
            ErrorType::GeneralError => "GENERAL_ERROR",
        }
    }
}

impl OrchestratorError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        OrchestratorError::InvalidRequest {
            message: message.into(),
        }
    }

    /// 將內部錯誤歸類為對外的錯誤類型
    pub fn error_type(&self) -> ErrorType {
        match self {
            OrchestratorError::InvalidRequest { .. }
            | OrchestratorError::SerializationError(_) => ErrorType::InvalidRequest,
            OrchestratorError::MissingApiKey { .. } => ErrorType::MissingApiKeys,
            OrchestratorError::ServiceError { error_type, .. } => *error_type,
            OrchestratorError::InsightsUnavailable { .. } => ErrorType::QlooApiError,
            OrchestratorError::LlmUnavailable { .. } => ErrorType::LlmApiError,
            OrchestratorError::UpstreamStatus { .. }
            | OrchestratorError::UpstreamFormat { .. }
            | OrchestratorError::HttpError(_) => ErrorType::LlmApiError,
            OrchestratorError::IoError(_)
            | OrchestratorError::TransportError { .. }
            | OrchestratorError::ConfigError { .. }
            | OrchestratorError::MissingConfigError { .. }
            | OrchestratorError::InvalidConfigValueError { .. } => ErrorType::GeneralError,
        }
    }

    pub fn user_friendly_message(&self) -> &'static str {
        self.error_type().user_message()
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.error_type() {
            ErrorType::MissingApiKeys => {
                "Set GEMINI_API_KEY or OPENAI_API_KEY (and QLOO_API_KEY for live insights)"
            }
            ErrorType::InvalidRequest => "Check the request body fields and the phase value",
            ErrorType::QlooApiError => "Enable MOCK_INSIGHTS_FALLBACK or check QLOO_API_KEY",
            ErrorType::LlmApiError => "Check the model endpoints and API quotas",
            ErrorType::OnboardingError | ErrorType::GeneralError => {
                "Re-run with --verbose for details"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

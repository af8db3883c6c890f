use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("HTTP request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Server responded with {status} {reason}")]
    ServerStatus { status: u16, reason: String },

    #[error("Response body is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Request with method {method} cannot have a body")]
    BodyNotAllowed { method: String },

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Form has no field named '{field}'")]
    MissingField { field: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl SubmitError {
    /// Whether the error happened before any request left the process.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SubmitError::IoError(_)
                | SubmitError::MissingField { .. }
                | SubmitError::ConfigValidationError { .. }
                | SubmitError::InvalidConfigValueError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SubmitError::TransportError(e) if e.is_timeout() => {
                "The server did not answer in time".to_string()
            }
            SubmitError::TransportError(e) if e.is_connect() => {
                "Could not connect to the server".to_string()
            }
            SubmitError::TransportError(_) => "The request could not be sent".to_string(),
            SubmitError::ServerStatus { status, .. } => {
                format!("The server rejected the submission (HTTP {})", status)
            }
            SubmitError::InvalidPayload(_) => "The server reply could not be understood".to_string(),
            SubmitError::BodyNotAllowed { method } => {
                format!("A {} request cannot carry form data", method)
            }
            SubmitError::InvalidMethod { method } => format!("'{}' is not an HTTP method", method),
            SubmitError::IoError(e) => format!("File access failed: {}", e),
            SubmitError::MissingField { field } => format!("The form is missing the '{}' field", field),
            SubmitError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            SubmitError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid '{}': {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SubmitError::TransportError(_) => "Check the network connection and the form action URL",
            SubmitError::ServerStatus { .. } => "Try again later or contact the site owner",
            SubmitError::InvalidPayload(_) => "Make sure the endpoint answers with JSON",
            SubmitError::BodyNotAllowed { .. } | SubmitError::InvalidMethod { .. } => {
                "Use POST (or another method that accepts a body) for the form"
            }
            SubmitError::IoError(_) => "Check that the config file exists and is readable",
            SubmitError::MissingField { .. } => "Add 'email' and 'plan' fields to the form definition",
            SubmitError::ConfigValidationError { .. } | SubmitError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SubmitError>;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("API request failed: {0}")]
    ApiError(#[from] ApiError),

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LeadError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::ValidationError(e) => e.user_message(),
            LeadError::ApiError(e) => e.server_message(),
            LeadError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            LeadError::ConfigError { message } => message.clone(),
            LeadError::IoError(e) => format!("File access failed: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;

/// Local input checks; these never reach the network layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("phone number must be exactly 10 digits")]
    InvalidPhone,

    #[error("OTP must not be empty")]
    MissingOtp,

    #[error("OTP must be 4 to 6 digits")]
    InvalidOtp,
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingFields(_) => "Missing Fields",
            ValidationError::InvalidPhone => "Invalid Phone Number",
            ValidationError::MissingOtp => "Missing OTP",
            ValidationError::InvalidOtp => "Invalid OTP",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingFields(fields) => {
                format!("Please fill out: {}", fields.join(", "))
            }
            ValidationError::InvalidPhone => "Please enter a valid 10-digit number.".to_string(),
            ValidationError::MissingOtp => {
                "Please enter the OTP before submitting.".to_string()
            }
            ValidationError::InvalidOtp => "Please enter a valid 4-6 digit OTP.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Transport failure or a non-2xx status.
    Network,
    /// A 2xx response whose body was unparsable or carried no usable signal.
    Protocol,
}

/// Uniform failure shape for all gateway operations. Carries whatever the
/// server sent back so callers can inspect duplicate/error messages.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub http_status: Option<u16>,
    pub body_text: Option<String>,
    pub body_json: Option<Value>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: message.into(),
            http_status: None,
            body_text: None,
            body_json: None,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Protocol,
            message: message.into(),
            http_status: None,
            body_text: None,
            body_json: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_body(mut self, text: String) -> Self {
        self.body_json = serde_json::from_str(&text).ok();
        self.body_text = Some(text);
        self
    }

    /// Server-side message candidates, lowercased, in inspection order.
    fn message_candidates(&self) -> Vec<String> {
        let mut candidates = Vec::new();
        if let Some(json) = &self.body_json {
            for key in ["msg", "message", "error"] {
                if let Some(s) = json.get(key).and_then(Value::as_str) {
                    if !s.is_empty() {
                        candidates.push(s.to_lowercase());
                    }
                }
            }
        }
        if let Some(text) = &self.body_text {
            if !text.is_empty() {
                candidates.push(text.to_lowercase());
            }
        }
        candidates.push(self.message.to_lowercase());
        candidates
    }

    /// A persist rejection that means "this contact is already saved".
    /// Matched case-insensitively: "already" together with one of
    /// "submit"/"submitted"/"contact", or an HTTP 409 status.
    pub fn indicates_duplicate(&self) -> bool {
        if self.http_status == Some(409) {
            return true;
        }
        self.message_candidates().iter().any(|s| {
            s.contains("already")
                && (s.contains("submit") || s.contains("submitted") || s.contains("contact"))
        })
    }

    /// Best available server-provided text for user-facing reporting.
    pub fn server_message(&self) -> String {
        if let Some(json) = &self.body_json {
            for key in ["message", "error"] {
                if let Some(s) = json.get(key).and_then(Value::as_str) {
                    if !s.is_empty() {
                        return s.to_string();
                    }
                }
            }
            return json.to_string();
        }
        if let Some(text) = &self.body_text {
            if !text.is_empty() {
                return text.clone();
            }
        }
        if !self.message.is_empty() {
            return self.message.clone();
        }
        match self.http_status {
            Some(status) => format!("HTTP {}", status),
            None => "HTTP ?".to_string(),
        }
    }
}

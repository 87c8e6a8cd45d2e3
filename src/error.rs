use std::fmt;

/// Errors produced by backend calls.
///
/// `NotFound` is a normal answer for lookups (a winner record that was never
/// created, a car deleted in the meantime); callers decide whether it is
/// exceptional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure: connection refused, reset, malformed response.
    Network(String),
    /// The backend answered 404.
    NotFound { resource: &'static str, id: u32 },
    /// The backend answered with another non-success status.
    Status { status: u16, message: String },
    /// The response body could not be decoded.
    Decode(String),
    /// The request was rejected before reaching the backend.
    Invalid(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {}", msg),
            ApiError::NotFound { resource, id } => write!(f, "{} {} not found", resource, id),
            ApiError::Status { status, message } => {
                write!(f, "backend answered {}: {}", status, message)
            }
            ApiError::Decode(msg) => write!(f, "decode failed: {}", msg),
            ApiError::Invalid(msg) => write!(f, "invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: u32) -> Self {
        ApiError::NotFound { resource, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Network(_) => 502,
            ApiError::NotFound { .. } => 404,
            ApiError::Status { status, .. } => *status,
            ApiError::Decode(_) => 502,
            ApiError::Invalid(_) => 400,
        }
    }
}

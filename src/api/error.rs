//! API error types for the label service client.

use thiserror::Error;

/// Errors that can occur when talking to the label service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - invalid or missing API token.
    #[error("Authentication failed: check your API token")]
    Unauthorized,

    /// Permission denied - the token lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A label with the same name already exists.
    #[error("Label already exists: {0}")]
    Conflict(String),

    /// The service rejected the request body.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Rate limited by the service.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Label service server error.
    #[error("Label service error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid service URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when retrieving the API token.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// The service returned a body the client could not interpret.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Connection validation failed.
    #[error("Connection validation failed: {0}")]
    ConnectionFailed(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::BadRequest(context.to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 | 422 => ApiError::Conflict(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_400() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "missing name");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "test");
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "label abc");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "label abc"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_409() {
        let err = ApiError::from_status(StatusCode::CONFLICT, "infra");
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_error_from_status_429() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "test");
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[test]
    fn test_error_from_status_500() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "test");
        assert!(matches!(err, ApiError::ServerError(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Unauthorized;
        assert_eq!(
            err.to_string(),
            "Authentication failed: check your API token"
        );

        let err = ApiError::Conflict("infra".to_string());
        assert_eq!(err.to_string(), "Label already exists: infra");
    }
}

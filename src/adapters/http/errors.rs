use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors that can occur when talking to the workflow API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request rejected by the API (HTTP 400, 422)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Project, run or artifact not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side failure (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("Malformed response: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Any other non-success status
    #[error("Unexpected status ({0}): {1}")]
    UnexpectedStatus(StatusCode, String),
}

impl ApiError {
    /// Classify a non-success response
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 | 422 => Self::InvalidRequest(body),
            404 => Self::NotFound(body),
            500..=599 => Self::ServerError(status, body),
            _ => Self::UnexpectedStatus(status, body),
        }
    }
}

impl From<ApiError> for DomainError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(body) => Self::ApiStatus {
                status: 404,
                message: body,
            },
            ApiError::InvalidRequest(body) => Self::ApiStatus {
                status: 400,
                message: body,
            },
            ApiError::ServerError(status, body) | ApiError::UnexpectedStatus(status, body) => {
                Self::ApiStatus {
                    status: status.as_u16(),
                    message: body,
                }
            }
            ApiError::NetworkError(e) => Self::ApiRequest(e.to_string()),
            ApiError::JsonError(e) => Self::SerializationError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "missing".into()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad".into()),
            ApiError::InvalidRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "oops".into()),
            ApiError::ServerError(_, _)
        ));
    }

    #[test]
    fn test_into_domain_error_keeps_status() {
        let err: DomainError = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream".into()).into();
        assert!(matches!(err, DomainError::ApiStatus { status: 502, .. }));
        assert!(err.is_transient());
    }
}

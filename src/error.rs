//! Error types.
//!
//! Two families live here. [`Error`] covers infrastructure failures: reading
//! the config file, binding a port, accepting a connection. [`ApiError`] is
//! the application-level taxonomy that handlers return; it never escapes the
//! process as a Rust error, it is rendered into a JSON response by the
//! centralized error handler in [`App`](crate::App).

use http::StatusCode;
use serde::Serialize;

use crate::middleware::sanitize::ValidationError;

/// The error type returned by courier's fallible start-up operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("configuration: {0}")]
    Configuration(String),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),
}

/// Application errors, rendered by the centralized error handler.
///
/// Return these from handlers as `Result<T, ApiError>`. The handler output
/// is stamped with the request's transaction id before it is written.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<ValidationError>,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::Configuration(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::InvalidArgument(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Builds the wire body for this error.
    pub(crate) fn into_body(self, transaction_id: Option<String>) -> ErrorBody {
        let message = self.to_string();
        let errors = match self {
            Self::Validation { errors, .. } => errors,
            _ => Vec::new(),
        };
        ErrorBody { message, errors, source: "Internal", transaction_id }
    }
}

/// JSON shape shared by every error response the service writes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(ApiError::AccessDenied("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Database("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::InvalidArgument("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn body_omits_empty_errors_and_missing_tx() {
        let body = ApiError::NotFound("GET /nope".into()).into_body(None);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Not found: GET /nope", "source": "Internal" })
        );
    }

    #[test]
    fn validation_body_carries_records() {
        let err = ApiError::Validation {
            message: "Bad Request".into(),
            errors: vec![ValidationError::new("Invalid data <b>", "name")],
        };
        let json = serde_json::to_value(err.into_body(Some("tx-1".into()))).unwrap();
        assert_eq!(json["message"], "Bad Request");
        assert_eq!(json["transactionId"], "tx-1");
        assert_eq!(json["errors"][0]["param"], "name");
        assert_eq!(json["errors"][0]["location"], "body");
    }
}

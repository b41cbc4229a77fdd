//! Error types for the analyzer core
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;
use thiserror::Error;

// == Error Enum ==
#[derive(Error, Debug)]
pub enum Error {
    /// A value could not be encoded for, or decoded from, the cache
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A dependency failed its readiness probe
    #[error("Not ready: {0}")]
    NotReady(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_ready = Error::NotReady("cache".to_string()).into_response();
        assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);

        let decode = serde_json::from_str::<u8>("oops").unwrap_err();
        let serialization = Error::from(decode).into_response();
        assert_eq!(serialization.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display() {
        let err = Error::NotReady("cache round-trip failed".to_string());
        assert_eq!(err.to_string(), "Not ready: cache round-trip failed");
    }
}

//! Helper types and traits for cleaner route handlers.
//!
//! Provides an extension trait for converting `Result` types into JSON
//! error responses, reducing boilerplate in routes.

use audarma_core::Error;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Standard result type for route handlers returning JSON.
pub type RouteResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn error_response(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: msg.into(),
        }),
    )
}

/// Extension trait for converting results to `RouteResult<T>`.
///
/// Invalid requests and undecodable bodies become 400 Bad Request; every
/// other failure is a 500.
pub trait ResultExt<T> {
    fn or_status(self) -> RouteResult<T>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn or_status(self) -> RouteResult<T> {
        self.map_err(|e| {
            let status = match &e {
                Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, e.to_string())
        })
    }
}

impl<T> ResultExt<T> for Result<T, JsonRejection> {
    fn or_status(self) -> RouteResult<T> {
        self.map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_is_bad_request() {
        let result: Result<(), Error> = Err(Error::InvalidRequest("missing locale".into()));
        let (status, body) = result.or_status().unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[test]
    fn test_missing_api_key_is_internal() {
        let result: Result<(), Error> = Err(Error::TranslationMissingApiKey);
        let (status, body) = result.or_status().unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "translation API key not configured");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let result: Result<(), Error> = Err(Error::AllProvidersExhausted { attempts: 2 });
        let (status, _) = result.or_status().unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Mapping of library errors onto HTTP responses.

use crate::Error;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Message returned for catalog read/parse failures; details go to the log.
const CATALOG_FAILURE: &str = "Error reading checklist data.";

/// An error returned from a request handler.
///
/// Always rendered as `{ "success": false, "error": <message> }`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match &self.0 {
            Error::Io(_) | Error::Parse(_) | Error::Json(_) => CATALOG_FAILURE.to_string(),
            Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let body = Json(serde_json::json!({
            "success": false,
            "error": self.public_message()
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(Error::Validation("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(Error::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(Error::Parse("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_catalog_failures_hide_details() {
        let err = ApiError(Error::Parse("/etc/secret/checklists.json: bad".into()));
        assert_eq!(err.public_message(), CATALOG_FAILURE);
        let err = ApiError(Error::NotFound("Test session not found.".into()));
        assert_eq!(err.public_message(), "Test session not found.");
    }
}

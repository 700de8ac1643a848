//! HTTP mapping for library errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::Error;

/// Wrapper giving library errors an HTTP representation.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self.0 {
            Error::MissingInput(msg) => (
                StatusCode::BAD_REQUEST,
                "missing_input",
                msg.clone(),
                None,
            ),
            Error::InvalidRangeFormat(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_page_range",
                msg.clone(),
                None,
            ),
            Error::InvalidParameter(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_parameter",
                msg.clone(),
                None,
            ),
            Error::ConversionFailed(msg) => {
                tracing::error!("conversion failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "conversion_failed",
                    "The document could not be converted".to_string(),
                    Some(msg.clone()),
                )
            }
            Error::Pdf(e) => {
                tracing::error!("PDF error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "PDF processing failed".to_string(),
                    Some(e.to_string()),
                )
            }
            Error::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "IO error".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type,
            message,
            details,
        });

        (status, body).into_response()
    }
}

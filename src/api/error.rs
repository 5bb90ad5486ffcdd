// HTTP error bodies: JSON for /get-formats, plain text for /download

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::downloader::{DownloadError, InputError};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// `{"error": ...}`; restrictions and bad input are 400, the rest 500
#[derive(Debug)]
pub struct JsonError(pub DownloadError);

impl From<DownloadError> for JsonError {
    fn from(e: DownloadError) -> Self {
        Self(e)
    }
}

impl From<InputError> for JsonError {
    fn from(e: InputError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let (status, error) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            tracing::error!("Failed to get formats: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {}", self.0),
            )
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Plain-text error; only bad input is 400
#[derive(Debug)]
pub struct PlainError(pub DownloadError);

impl From<DownloadError> for PlainError {
    fn from(e: DownloadError) -> Self {
        Self(e)
    }
}

impl From<InputError> for PlainError {
    fn from(e: InputError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        match self.0 {
            DownloadError::Input(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            other => {
                tracing::error!("Failed to download: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", other)).into_response()
            }
        }
    }
}

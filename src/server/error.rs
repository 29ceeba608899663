//! Maps song errors to HTTP responses.

use crate::song::{ErrorClass, SongError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Error body returned on every failed request.
#[derive(Serialize, Deserialize, Debug)]
pub struct HttpError {
    pub code: u16,
    pub message: String,
}

pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for SongError {
    fn into_response(self) -> Response {
        let class = self.class();
        let status = status_for(class);
        let message = match class {
            ErrorClass::Internal => {
                error!("Internal error while serving request: {}", self);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        };
        let body = HttpError {
            code: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

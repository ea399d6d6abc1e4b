use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use snafu::Snafu;

use crate::database::RepositoryError;
use crate::model::VideoId;
use crate::validate::ValidationError;
use crate::Located as _;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("{source}"))]
    Validation { source: ValidationError },

    #[snafu(display("Failed to decode JSON object: {reason}"))]
    MalformedBody { reason: String },

    #[snafu(display("Video ID does not exist"))]
    NotFound { id: Option<VideoId> },

    #[snafu(display("Video ID already exists"))]
    Conflict { id: VideoId },

    #[snafu(display("storage failure: {source}"))]
    Storage { source: RepositoryError },
}

impl From<RepositoryError> for ApiError {
    fn from(source: RepositoryError) -> Self {
        match source {
            RepositoryError::Conflict { id, .. } => ApiError::Conflict { id },
            source => ApiError::Storage { source },
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> Value {
        match self {
            ApiError::Validation { source } => serde_json::json!(source.errors),
            ApiError::Storage { .. } => Value::from("Internal Server Error"),
            other => Value::from(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage { source } => {
                tracing::error!(location = %source.location(), "{source}");
            }
            other => tracing::debug!("request rejected: {other}"),
        }

        let content = ErrorResponse {
            message: self.message(),
        };

        (self.status(), Json(content)).into_response()
    }
}

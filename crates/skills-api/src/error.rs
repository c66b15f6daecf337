use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use skills_core::CoreError;
use skills_types::api::ErrorBody;

/// Everything a handler can fail with. Rendered as `{"error": ...}` JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                CoreError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Upstream(_) | CoreError::MalformedUpstream { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                CoreError::Storage(_) | CoreError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let (message, raw) = match self {
            ApiError::Core(CoreError::Storage(detail) | CoreError::Internal(detail)) => {
                error!("request failed: {}", detail);
                ("Internal server error".to_string(), None)
            }
            ApiError::Core(CoreError::MalformedUpstream { raw }) => (message, Some(raw)),
            _ => (message, None),
        };
        (status, Json(ErrorBody { error: message, raw })).into_response()
    }
}

/// Path ids that are not UUIDs cannot name anything, so they are a 404.
pub fn path_id(raw: &str, missing: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Core(CoreError::not_found(missing)))
}

use anifin_core::error::{ApiError, ErrorEnvelope};
use anifin_metadata::MetadataError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        Self(match e {
            MetadataError::SourceUnavailable(_) | MetadataError::MalformedResponse(_) => {
                ApiError::BadGateway(e.to_string())
            }
            MetadataError::NotFound => ApiError::NotFound("entry not found".into()),
            MetadataError::Cache(_) => ApiError::Internal(e.to_string()),
        })
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moviefinder_core::error::{ApiError, ErrorEnvelope};
use tracing::error;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = self.0.code(), error = %self.0, "request failed");
        }
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<moviefinder_catalog::CatalogError> for AppError {
    fn from(e: moviefinder_catalog::CatalogError) -> Self {
        Self(e.into())
    }
}

impl From<moviefinder_db::StorageError> for AppError {
    fn from(e: moviefinder_db::StorageError) -> Self {
        Self(ApiError::Internal(format!("storage error: {e}")))
    }
}

//! Mapping of domain errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use projectflow_domain::ProjectFlowError;
use serde::Serialize;
use tracing::error;

use crate::utils::logging::error_label;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub ProjectFlowError);

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    error_type: &'static str,
    message: &'a str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            ProjectFlowError::Validation(_) | ProjectFlowError::InvalidOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            ProjectFlowError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ProjectFlowError::Permission(_) => StatusCode::FORBIDDEN,
            ProjectFlowError::NotFound(_) => StatusCode::NOT_FOUND,
            ProjectFlowError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ProjectFlowError::Database(_)
            | ProjectFlowError::Config(_)
            | ProjectFlowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProjectFlowError> for ApiError {
    fn from(err: ProjectFlowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "request failed");
        }

        let body = ErrorBody {
            status: "error",
            error_type: error_label(&self.0),
            message: self.0.message(),
        };
        (status, Json(body)).into_response()
    }
}

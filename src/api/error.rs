use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;

use crate::api::models::ErrorBody;
use crate::errors::{AppError, ValidationError};
use crate::services::report::ReportError;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Validation(ValidationError::InvalidCredentials | ValidationError::NotSignedIn) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Validation(ValidationError::PendingApproval(_) | ValidationError::AdminOnly(_)) => {
                StatusCode::FORBIDDEN
            }
            AppError::Validation(ValidationError::DuplicateUsername(_)) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::Parse { .. } => StatusCode::BAD_REQUEST,
            AppError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            remediation: None,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = match self {
            ReportError::MissingCredentials(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::Failed(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            remediation: Some(self.remediation().to_string()),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Slot;

    #[test]
    fn test_status_codes_by_error_kind() {
        assert_eq!(AppError::NotConfigured.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::from(ValidationError::SlotFull { slot: Slot::Gol, capacity: 4 }).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::parse("filter", "bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(anyhow::anyhow!("disk on fire")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

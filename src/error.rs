use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    gate::GateFailure,
    state::state_machine::{InvalidTransition, RachaStatus},
};

/// Message shown when an account has no roster entry.
pub const MEMBER_NOT_FOUND_MESSAGE: &str =
    "no member is linked to this account; contact the admin to be added to the roster";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// The store refused or did not apply a write.
    #[error("persistence failure: {0}")]
    Persistence(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Attendance can only be recorded while the racha is open.
    #[error("racha `{racha_id}` is {status}; confirmations are closed")]
    RachaClosed { racha_id: Uuid, status: RachaStatus },
    /// The caller's account could not be mapped to a member.
    #[error("member not found")]
    MemberNotFound,
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
            StorageError::Rejected { message } | StorageError::Conflict { message } => {
                ServiceError::Persistence(message)
            }
        }
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or misconfigured.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Persistence(message) => {
                AppError::Internal(format!("persistence failure: {message}"))
            }
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            closed @ ServiceError::RachaClosed { .. } => AppError::Conflict(closed.to_string()),
            ServiceError::MemberNotFound => AppError::NotFound(MEMBER_NOT_FOUND_MESSAGE.into()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

impl From<GateFailure> for AppError {
    fn from(failure: GateFailure) -> Self {
        match failure {
            GateFailure::MissingConfig => {
                AppError::ServiceUnavailable("identity provider is not configured".into())
            }
            GateFailure::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_not_found_is_distinct_from_persistence() {
        let missing = AppError::from(ServiceError::MemberNotFound);
        let rejected = AppError::from(ServiceError::from(StorageError::rejected("no row")));

        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(rejected.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn gate_failures_map_to_5xx() {
        assert_eq!(
            AppError::from(GateFailure::MissingConfig)
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(GateFailure::Internal("boom".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn closed_racha_is_a_conflict() {
        let err = AppError::from(ServiceError::RachaClosed {
            racha_id: Uuid::nil(),
            status: RachaStatus::InProgress,
        });
        assert!(err.to_string().contains("in_progress"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}

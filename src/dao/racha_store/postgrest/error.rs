//! Error types shared by the PostgREST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`PostgrestError`] failures.
pub type PostgrestResult<T> = Result<T, PostgrestError>;

/// Failures that can occur while talking to the PostgREST endpoint.
#[derive(Debug, Error)]
pub enum PostgrestError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build PostgREST client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table endpoint could not be sent.
    #[error("failed to send PostgREST request to `{table}`")]
    RequestSend {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    /// PostgREST answered with an unexpected status code.
    #[error("unexpected PostgREST response status {status} for `{table}`")]
    RequestStatus { table: String, status: StatusCode },
    /// Response payload could not be decoded into the expected rows.
    #[error("failed to decode PostgREST response for `{table}`")]
    DecodeResponse {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    /// A write asked for its representation but no row came back.
    #[error("PostgREST returned no row for write on `{table}`")]
    EmptyRepresentation { table: String },
}

impl From<PostgrestError> for StorageError {
    fn from(err: PostgrestError) -> Self {
        match err {
            PostgrestError::RequestStatus { status, .. } if status == StatusCode::CONFLICT => {
                StorageError::Conflict {
                    message: err.to_string(),
                }
            }
            PostgrestError::EmptyRepresentation { .. } => StorageError::rejected(err.to_string()),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = StorageError::from(PostgrestError::RequestStatus {
            table: "racha_attendance".into(),
            status: StatusCode::CONFLICT,
        });
        match err {
            StorageError::Conflict { message } => {
                assert!(message.contains("409"), "{message}");
                assert!(message.contains("racha_attendance"), "{message}");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn other_statuses_mean_unavailable() {
        let err = StorageError::from(PostgrestError::RequestStatus {
            table: "rachas".into(),
            status: StatusCode::BAD_GATEWAY,
        });
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }

    #[test]
    fn missing_representation_is_a_rejected_write() {
        let err = StorageError::from(PostgrestError::EmptyRepresentation {
            table: "racha_attendance".into(),
        });
        assert!(matches!(err, StorageError::Rejected { .. }));
    }
}

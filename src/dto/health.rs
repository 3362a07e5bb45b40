use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// False when the gate runs without an identity provider.
    pub identity_configured: bool,
}

impl HealthResponse {
    /// The store answered its ping.
    pub fn ok(identity_configured: bool) -> Self {
        Self {
            status: "ok".to_string(),
            identity_configured,
        }
    }

    /// The store could not be reached.
    pub fn degraded(identity_configured: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            identity_configured,
        }
    }
}

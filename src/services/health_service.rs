use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the store and report whether the gate has an identity provider.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let identity_configured = state.gate().is_configured();
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(identity_configured),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded(identity_configured)
        }
    }
}

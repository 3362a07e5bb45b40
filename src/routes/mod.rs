use axum::{Router, http::Uri, middleware};

use crate::{error::AppError, gate::middleware::gate_requests, state::SharedState};

pub mod admin;
pub mod attendance;
pub mod docs;
pub mod health;
pub mod public;
pub mod sse;

/// Compose all route trees. Application routes sit behind the request gate; the
/// health check and the documentation are served ungated.
pub fn router(state: SharedState) -> Router<()> {
    // The fallback is registered before the gate layer so unmatched paths are gated too.
    let gated = public::router()
        .merge(sse::router())
        .merge(attendance::router())
        .merge(admin::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), gate_requests));

    let docs_router = docs::router(state.clone());

    gated
        .merge(health::router())
        .merge(docs_router)
        .with_state(state)
}

/// Answer for paths the gate allowed but no handler serves.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for `{}`", uri.path()))
}

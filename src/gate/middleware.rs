use std::panic::AssertUnwindSafe;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::error;

use crate::{
    error::AppError,
    gate::{GateFailure, GateOutcome, append_cookies},
    identity::Credentials,
    state::SharedState,
};

/// Axum middleware running the [`RequestGate`](super::RequestGate) in front of every
/// application route.
pub async fn gate_requests(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let credentials = Credentials::from_headers(req.headers());
    let store = state.store();

    let outcome = AssertUnwindSafe(state.gate().evaluate(store.as_ref(), &path, credentials))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            error!(path = %path, "request gate panicked");
            GateOutcome::Error(GateFailure::Internal(
                "unexpected error while gating request".into(),
            ))
        });

    match outcome {
        GateOutcome::Allow { caller, cookies } => {
            if let Some(caller) = caller {
                req.extensions_mut().insert(caller);
            }
            let mut response = next.run(req).await;
            append_cookies(response.headers_mut(), &cookies);
            response
        }
        GateOutcome::Redirect { location, cookies } => {
            let mut response = (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
            append_cookies(response.headers_mut(), &cookies);
            response
        }
        GateOutcome::Error(failure) => AppError::from(failure).into_response(),
    }
}

use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/rachas/events",
    tag = "rachas",
    responses(
        (
            status = 200,
            description = "Racha status and attendance changes",
            content_type = "text/event-stream",
            body = String
        )
    )
)]
/// Stream racha status and attendance changes to connected pages.
pub async fn racha_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!("new racha SSE connection");
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rachas/events", get(racha_events))
}

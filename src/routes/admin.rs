use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        profile::ProfileResponse,
        racha::{TransitionRequest, TransitionResponse},
    },
    error::AppError,
    gate::Caller,
    services::{lifecycle_service, profile_service},
    state::SharedState,
};

/// Admin area. Role enforcement happens in the request gate; `/admin/perfil` is open
/// to every signed-in account.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/perfil", get(get_profile))
        .route("/admin/rachas/{id}/start", post(start_racha))
        .route("/admin/rachas/{id}/reopen", post(reopen_racha))
}

#[utoipa::path(
    get,
    path = "/admin/perfil",
    tag = "admin",
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 302, description = "Not signed in; redirected to the login page")
    )
)]
/// Return the caller's own role and linked member.
pub async fn get_profile(
    State(state): State<SharedState>,
    caller: Caller,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(profile_service::my_profile(&state, &caller).await?))
}

#[utoipa::path(
    post,
    path = "/admin/rachas/{id}/start",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the racha")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Racha started", body = TransitionResponse),
        (status = 302, description = "Not staff; redirected home"),
        (status = 400, description = "Action not confirmed"),
        (status = 409, description = "Racha is not open")
    )
)]
/// Freeze the roster of an open racha by moving it to `in_progress`.
pub async fn start_racha(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    caller: Caller,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(lifecycle_service::start_racha(&state, id, &caller).await?))
}

#[utoipa::path(
    post,
    path = "/admin/rachas/{id}/reopen",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the racha")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Racha reopened", body = TransitionResponse),
        (status = 302, description = "Not staff; redirected home"),
        (status = 400, description = "Action not confirmed")
    )
)]
/// Send a racha back to `open` so members can answer again.
pub async fn reopen_racha(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    caller: Caller,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(lifecycle_service::reopen_racha(&state, id, &caller).await?))
}

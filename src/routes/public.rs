use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::racha::{MemberSummary, RachaDetail, RachaSummary},
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Read-only endpoints reachable without signing in.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rachas", get(list_rachas))
        .route("/rachas/{id}", get(get_racha))
        .route("/integrantes", get(list_members))
}

#[utoipa::path(
    get,
    path = "/rachas",
    tag = "rachas",
    responses((status = 200, description = "All rachas, most recent first", body = [RachaSummary]))
)]
/// List every racha.
pub async fn list_rachas(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RachaSummary>>, AppError> {
    Ok(Json(public_service::list_rachas(&state).await?))
}

#[utoipa::path(
    get,
    path = "/rachas/{id}",
    tag = "rachas",
    params(("id" = String, Path, description = "Identifier of the racha")),
    responses(
        (status = 200, description = "Racha with its roster", body = RachaDetail),
        (status = 404, description = "Unknown racha")
    )
)]
/// Return a racha with who confirmed and who declined.
pub async fn get_racha(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RachaDetail>, AppError> {
    Ok(Json(public_service::racha_detail(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/integrantes",
    tag = "rachas",
    responses((status = 200, description = "Member directory", body = [MemberSummary]))
)]
/// List the roster.
pub async fn list_members(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MemberSummary>>, AppError> {
    Ok(Json(public_service::list_members(&state).await?))
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::racha::{AttendanceResponse, AttendanceView, RecordAttendanceRequest},
    error::AppError,
    gate::Caller,
    services::attendance_service,
    state::SharedState,
};

/// Confirmation endpoints for signed-in members.
pub fn router() -> Router<SharedState> {
    Router::new().route("/presenca/{id}", get(get_attendance).put(put_attendance))
}

#[utoipa::path(
    get,
    path = "/presenca/{id}",
    tag = "attendance",
    params(("id" = String, Path, description = "Identifier of the racha")),
    responses(
        (status = 200, description = "Confirmation page model", body = AttendanceView),
        (status = 302, description = "Not signed in; redirected to the login page"),
        (status = 404, description = "Unknown racha")
    )
)]
/// Return the caller's answer and what they may do on this racha.
pub async fn get_attendance(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    caller: Caller,
) -> Result<Json<AttendanceView>, AppError> {
    Ok(Json(attendance_service::attendance_view(&state, id, &caller).await?))
}

#[utoipa::path(
    put,
    path = "/presenca/{id}",
    tag = "attendance",
    params(("id" = String, Path, description = "Identifier of the racha")),
    request_body = RecordAttendanceRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AttendanceResponse),
        (status = 302, description = "Not signed in; redirected to the login page"),
        (status = 404, description = "Unknown racha, or no member linked to the account"),
        (status = 409, description = "Racha is not open for confirmations")
    )
)]
/// Confirm or decline participation in an open racha.
pub async fn put_attendance(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    caller: Caller,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<Json<AttendanceResponse>, AppError> {
    let recorded =
        attendance_service::record_attendance(&state, id, &caller, payload.status).await?;
    Ok(Json(recorded))
}

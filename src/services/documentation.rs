use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the racha backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::list_rachas,
        crate::routes::public::get_racha,
        crate::routes::public::list_members,
        crate::routes::sse::racha_events,
        crate::routes::attendance::get_attendance,
        crate::routes::attendance::put_attendance,
        crate::routes::admin::get_profile,
        crate::routes::admin::start_racha,
        crate::routes::admin::reopen_racha,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::racha::RachaSummary,
            crate::dto::racha::MemberSummary,
            crate::dto::racha::RachaDetail,
            crate::dto::racha::AttendanceView,
            crate::dto::racha::RecordAttendanceRequest,
            crate::dto::racha::AttendanceResponse,
            crate::dto::racha::TransitionRequest,
            crate::dto::racha::TransitionResponse,
            crate::dto::profile::ProfileResponse,
            crate::dto::sse::StatusChangedEvent,
            crate::dto::sse::AttendanceChangedEvent,
            crate::state::state_machine::RachaStatus,
            crate::state::state_machine::AttendanceStatus,
            crate::gate::Role,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rachas", description = "Public racha listings and live updates"),
        (name = "attendance", description = "Confirmations for signed-in members"),
        (name = "admin", description = "Racha lifecycle actions for admins and directors"),
    )
)]
pub struct ApiDoc;

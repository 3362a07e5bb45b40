use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::AttendanceEntity,
    dto::sse::{AttendanceChangedEvent, ServerEvent, StatusChangedEvent},
    state::{SharedState, state_machine::Plan},
};

const EVENT_STATUS_CHANGED: &str = "racha.status_changed";
const EVENT_ATTENDANCE_CHANGED: &str = "racha.attendance_changed";

/// Broadcast a persisted status transition.
pub fn broadcast_status_changed(state: &SharedState, racha_id: Uuid, plan: &Plan) {
    let payload = StatusChangedEvent {
        racha_id,
        from: plan.from,
        to: plan.to,
    };
    send_event(state, EVENT_STATUS_CHANGED, &payload);
}

/// Broadcast a persisted attendance answer.
pub fn broadcast_attendance_changed(state: &SharedState, record: &AttendanceEntity) {
    let payload = AttendanceChangedEvent {
        racha_id: record.racha_id,
        member_id: record.member_id,
        status: record.status,
    };
    send_event(state, EVENT_ATTENDANCE_CHANGED, &payload);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

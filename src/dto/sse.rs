use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::state_machine::{AttendanceStatus, RachaStatus};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an admin starts or reopens a racha.
pub struct StatusChangedEvent {
    pub racha_id: Uuid,
    pub from: RachaStatus,
    pub to: RachaStatus,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a member confirms or declines.
pub struct AttendanceChangedEvent {
    pub racha_id: Uuid,
    pub member_id: Uuid,
    pub status: AttendanceStatus,
}

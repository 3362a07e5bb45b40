//! Payloads for the racha listing, attendance and lifecycle endpoints.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{AttendanceEntity, MemberEntity, RachaEntity},
    dto::validation::validate_confirmed,
    state::state_machine::{AttendanceStatus, RachaStatus},
};

/// Racha as listed publicly.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RachaSummary {
    pub id: Uuid,
    pub status: RachaStatus,
    pub title: Option<String>,
    pub scheduled_for: Option<String>,
}

impl From<RachaEntity> for RachaSummary {
    fn from(value: RachaEntity) -> Self {
        Self {
            id: value.id,
            status: value.status,
            title: value.title,
            scheduled_for: value.scheduled_for,
        }
    }
}

/// Public member directory entry. Contact addresses are never exposed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<MemberEntity> for MemberSummary {
    fn from(value: MemberEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

/// Racha with its roster split by declared intent.
#[derive(Debug, Serialize, ToSchema)]
pub struct RachaDetail {
    pub racha: RachaSummary,
    pub confirmed: Vec<MemberSummary>,
    pub declined: Vec<MemberSummary>,
    pub confirmed_count: usize,
    pub declined_count: usize,
}

/// What the signed-in caller sees on the confirmation page of a racha.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceView {
    pub racha: RachaSummary,
    /// Member the caller plays as, when one could be resolved.
    pub member_id: Option<Uuid>,
    /// The caller's current answer, if any.
    pub my_status: Option<AttendanceStatus>,
    /// True only while the racha is open and a member is linked.
    pub can_confirm: bool,
    /// Read-only notice explaining why confirming is not possible.
    pub notice: Option<String>,
    /// Admin/director affordance to send a non-open racha back to open.
    pub can_reopen: bool,
}

/// Request body for `PUT /presenca/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordAttendanceRequest {
    pub status: AttendanceStatus,
}

/// Stored attendance after a confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub racha_id: Uuid,
    pub member_id: Uuid,
    pub status: AttendanceStatus,
}

impl From<AttendanceEntity> for AttendanceResponse {
    fn from(value: AttendanceEntity) -> Self {
        Self {
            racha_id: value.racha_id,
            member_id: value.member_id,
            status: value.status,
        }
    }
}

/// Request body for the admin start/reopen actions.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TransitionRequest {
    /// Must be `true`; guards against accidental clicks.
    #[validate(custom(function = "validate_confirmed"))]
    pub confirm: bool,
}

/// Result of an admin status change.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub racha: RachaSummary,
    pub previous: RachaStatus,
}

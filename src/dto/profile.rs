use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::racha::MemberSummary, gate::Role};

/// Self-service profile returned under `/admin/perfil`.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    /// Roster entry the account plays as.
    pub member: Option<MemberSummary>,
}

//! Rows read from and written to the store. Field names follow the table columns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    gate::Role,
    state::state_machine::{AttendanceStatus, RachaStatus},
};

/// Row of `profiles`: one per authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntity {
    /// Same identifier as the identity provider's user id.
    pub id: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    /// Explicit link to the member this account plays as.
    #[serde(default)]
    pub member_id: Option<Uuid>,
}

impl ProfileEntity {
    /// Privilege level derived from the free-form `role` column.
    pub fn role(&self) -> Role {
        Role::from_column(self.role.as_deref())
    }
}

/// Row of `members`: a player on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntity {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Row of `rachas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RachaEntity {
    pub id: Uuid,
    pub status: RachaStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<String>,
}

/// Row of `racha_attendance`, unique on `(racha_id, member_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntity {
    pub id: Uuid,
    pub racha_id: Uuid,
    pub member_id: Uuid,
    pub status: AttendanceStatus,
}

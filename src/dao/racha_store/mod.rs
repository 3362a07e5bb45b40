pub mod memory;
#[cfg(feature = "supabase")]
pub mod postgrest;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    dao::{
        models::{AttendanceEntity, MemberEntity, ProfileEntity, RachaEntity},
        storage::StorageResult,
    },
    state::state_machine::{AttendanceStatus, RachaStatus},
};

/// Abstraction over the tables the gate and the lifecycle manager touch.
pub trait RachaStore: Send + Sync {
    fn find_profile(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>>;
    fn find_member(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>>;
    fn find_member_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>>;
    fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>>;
    fn find_racha(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RachaEntity>>>;
    fn list_rachas(&self) -> BoxFuture<'static, StorageResult<Vec<RachaEntity>>>;
    /// Set `next` only if the racha is still in `expected`. Resolves to `false` when
    /// nothing was updated.
    fn update_racha_status(
        &self,
        id: Uuid,
        expected: RachaStatus,
        next: RachaStatus,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_attendance(
        &self,
        racha_id: Uuid,
        member_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AttendanceEntity>>>;
    fn list_attendance(
        &self,
        racha_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttendanceEntity>>>;
    /// Insert or overwrite the record for `(racha_id, member_id)` in one atomic step.
    fn upsert_attendance(
        &self,
        racha_id: Uuid,
        member_id: Uuid,
        status: AttendanceStatus,
    ) -> BoxFuture<'static, StorageResult<AttendanceEntity>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

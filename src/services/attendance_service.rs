//! Attendance confirmation for the signed-in caller.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::{ProfileEntity, RachaEntity},
        racha_store::RachaStore,
        storage::StorageError,
    },
    dto::racha::{AttendanceResponse, AttendanceView},
    error::{MEMBER_NOT_FOUND_MESSAGE, ServiceError},
    gate::{Caller, Role},
    identity::Identity,
    services::sse_events::broadcast_attendance_changed,
    state::{SharedState, state_machine::AttendanceStatus},
};

async fn load_racha(store: &dyn RachaStore, racha_id: Uuid) -> Result<RachaEntity, ServiceError> {
    store
        .find_racha(racha_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("racha `{racha_id}` not found")))
}

/// Find the member the caller plays as: the profile link first, then the member whose
/// contact address matches the account email.
pub async fn resolve_member_id(
    store: &dyn RachaStore,
    identity: &Identity,
    profile: Option<&ProfileEntity>,
) -> Result<Option<Uuid>, ServiceError> {
    if let Some(member_id) = profile.and_then(|profile| profile.member_id) {
        return Ok(Some(member_id));
    }

    let Some(email) = identity.email.clone() else {
        return Ok(None);
    };

    Ok(store.find_member_by_email(email).await?.map(|member| member.id))
}

/// Record the caller's answer for an open racha.
///
/// The store upserts on `(racha_id, member_id)`. A uniqueness conflict means another
/// request for the same member won an insert race; the write is retried once and lands
/// as an update.
pub async fn record_attendance(
    state: &SharedState,
    racha_id: Uuid,
    caller: &Caller,
    status: AttendanceStatus,
) -> Result<AttendanceResponse, ServiceError> {
    let store = state.store();
    let racha = load_racha(store.as_ref(), racha_id).await?;
    if !racha.status.accepts_attendance() {
        return Err(ServiceError::RachaClosed {
            racha_id,
            status: racha.status,
        });
    }

    let profile = store.find_profile(caller.identity.user_id).await?;
    let member_id = resolve_member_id(store.as_ref(), &caller.identity, profile.as_ref())
        .await?
        .ok_or(ServiceError::MemberNotFound)?;

    let record = match store.upsert_attendance(racha_id, member_id, status).await {
        Ok(record) => record,
        Err(StorageError::Conflict { message }) => {
            debug!(%racha_id, %member_id, %message, "attendance insert raced; retrying");
            store.upsert_attendance(racha_id, member_id, status).await?
        }
        Err(err) => return Err(err.into()),
    };

    info!(%racha_id, %member_id, status = status.as_str(), "attendance recorded");
    broadcast_attendance_changed(state, &record);
    Ok(record.into())
}

/// Build the caller's confirmation page model for a racha.
pub async fn attendance_view(
    state: &SharedState,
    racha_id: Uuid,
    caller: &Caller,
) -> Result<AttendanceView, ServiceError> {
    let store = state.store();
    let racha = load_racha(store.as_ref(), racha_id).await?;
    let profile = store.find_profile(caller.identity.user_id).await?;
    let role = caller
        .role
        .or_else(|| profile.as_ref().map(ProfileEntity::role))
        .unwrap_or(Role::None);

    let member_id = resolve_member_id(store.as_ref(), &caller.identity, profile.as_ref()).await?;
    let my_status = match member_id {
        Some(member_id) => store
            .find_attendance(racha_id, member_id)
            .await?
            .map(|record| record.status),
        None => None,
    };

    let open = racha.status.accepts_attendance();
    let notice = if !open {
        Some(format!(
            "this racha is {}; confirmations are closed",
            racha.status
        ))
    } else if member_id.is_none() {
        Some(MEMBER_NOT_FOUND_MESSAGE.to_string())
    } else {
        None
    };

    Ok(AttendanceView {
        racha: racha.into(),
        member_id,
        my_status,
        can_confirm: open && member_id.is_some(),
        notice,
        can_reopen: !open && role.is_staff(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::{
            models::{AttendanceEntity, MemberEntity},
            racha_store::memory::MemoryRachaStore,
            storage::StorageResult,
        },
        services::{
            fixtures::{Fixture, staff},
            lifecycle_service::reopen_racha,
        },
        state::state_machine::RachaStatus,
    };

    /// Store where a concurrent request wins the first `conflicts` inserts: the row is
    /// written, then the losing call reports a uniqueness conflict.
    struct RacingStore {
        inner: MemoryRachaStore,
        conflicts: AtomicUsize,
    }

    impl RacingStore {
        fn new(inner: MemoryRachaStore, conflicts: usize) -> Arc<dyn RachaStore> {
            Arc::new(Self {
                inner,
                conflicts: AtomicUsize::new(conflicts),
            })
        }
    }

    impl RachaStore for RacingStore {
        fn find_profile(
            &self,
            user_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
            self.inner.find_profile(user_id)
        }

        fn find_member(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
            self.inner.find_member(id)
        }

        fn find_member_by_email(
            &self,
            email: String,
        ) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
            self.inner.find_member_by_email(email)
        }

        fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
            self.inner.list_members()
        }

        fn find_racha(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RachaEntity>>> {
            self.inner.find_racha(id)
        }

        fn list_rachas(&self) -> BoxFuture<'static, StorageResult<Vec<RachaEntity>>> {
            self.inner.list_rachas()
        }

        fn update_racha_status(
            &self,
            id: Uuid,
            expected: RachaStatus,
            next: RachaStatus,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.update_racha_status(id, expected, next)
        }

        fn find_attendance(
            &self,
            racha_id: Uuid,
            member_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<AttendanceEntity>>> {
            self.inner.find_attendance(racha_id, member_id)
        }

        fn list_attendance(
            &self,
            racha_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<AttendanceEntity>>> {
            self.inner.list_attendance(racha_id)
        }

        fn upsert_attendance(
            &self,
            racha_id: Uuid,
            member_id: Uuid,
            status: AttendanceStatus,
        ) -> BoxFuture<'static, StorageResult<AttendanceEntity>> {
            let lost = self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if !lost {
                return self.inner.upsert_attendance(racha_id, member_id, status);
            }

            let winner = self.inner.upsert_attendance(racha_id, member_id, status);
            Box::pin(async move {
                winner.await?;
                Err(StorageError::Conflict {
                    message: "duplicate key value violates unique constraint".into(),
                })
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }
    }

    #[tokio::test]
    async fn duplicate_insert_rejection_is_retried_as_update() {
        let fixture = Fixture::wrapping(|store| RacingStore::new(store, 1));
        let racha_id = fixture.racha(RachaStatus::Open);
        let (caller, member_id) = fixture.linked_player();
        let mut events = fixture.state.events().subscribe();

        let recorded = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::Out)
            .await
            .unwrap();

        assert_eq!(recorded.member_id, member_id);
        assert_eq!(recorded.status, AttendanceStatus::Out);
        assert_eq!(fixture.store.attendance_len(), 1);
        assert_eq!(
            events.try_recv().unwrap().event.as_deref(),
            Some("racha.attendance_changed")
        );
    }

    #[tokio::test]
    async fn repeated_conflict_surfaces_as_persistence_failure() {
        let fixture = Fixture::wrapping(|store| RacingStore::new(store, 2));
        let racha_id = fixture.racha(RachaStatus::Open);
        let (caller, _) = fixture.linked_player();
        let mut events = fixture.state.events().subscribe();

        let err = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Persistence(_)), "{err:?}");
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn first_answer_creates_then_updates_one_record() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Open);
        let (caller, member_id) = fixture.linked_player();

        let first = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
            .await
            .unwrap();
        assert_eq!(first.member_id, member_id);
        assert_eq!(first.status, AttendanceStatus::In);
        assert_eq!(fixture.store.attendance_len(), 1);

        let second = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::Out)
            .await
            .unwrap();
        assert_eq!(second.status, AttendanceStatus::Out);
        assert_eq!(fixture.store.attendance_len(), 1);
        let stored = fixture
            .store
            .find_attendance(racha_id, member_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AttendanceStatus::Out);
    }

    #[tokio::test]
    async fn closed_racha_never_writes() {
        let fixture = Fixture::new();
        let (caller, _) = fixture.linked_player();

        for status in [RachaStatus::InProgress, RachaStatus::Closed] {
            let racha_id = fixture.racha(status);
            let err = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
                .await
                .unwrap_err();
            assert!(
                matches!(err, ServiceError::RachaClosed { status: s, .. } if s == status),
                "{err:?}"
            );
        }
        assert_eq!(fixture.store.attendance_len(), 0);
    }

    #[tokio::test]
    async fn reopened_racha_accepts_answers_again() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::InProgress);
        let (caller, _) = fixture.linked_player();

        assert!(
            record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
                .await
                .is_err()
        );

        reopen_racha(&fixture.state, racha_id, &staff(Role::Admin))
            .await
            .unwrap();

        let recorded = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
            .await
            .unwrap();
        assert_eq!(recorded.status, AttendanceStatus::In);
    }

    #[tokio::test]
    async fn email_fallback_resolves_unlinked_accounts() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Open);
        let (caller, member_id) = fixture.player_by_email();

        let recorded = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
            .await
            .unwrap();
        assert_eq!(recorded.member_id, member_id);
    }

    #[tokio::test]
    async fn unknown_member_is_reported_distinctly() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Open);
        let caller = fixture.stranger();

        let err = record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::In)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MemberNotFound), "{err:?}");
        assert_eq!(fixture.store.attendance_len(), 0);
    }

    #[tokio::test]
    async fn view_of_open_racha_allows_confirming() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Open);
        let (caller, member_id) = fixture.linked_player();
        record_attendance(&fixture.state, racha_id, &caller, AttendanceStatus::Out)
            .await
            .unwrap();

        let view = attendance_view(&fixture.state, racha_id, &caller)
            .await
            .unwrap();
        assert!(view.can_confirm);
        assert!(!view.can_reopen);
        assert_eq!(view.notice, None);
        assert_eq!(view.member_id, Some(member_id));
        assert_eq!(view.my_status, Some(AttendanceStatus::Out));
    }

    #[tokio::test]
    async fn view_of_closed_racha_is_read_only_with_reopen_for_staff() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::InProgress);

        let (player, _) = fixture.linked_player();
        let view = attendance_view(&fixture.state, racha_id, &player)
            .await
            .unwrap();
        assert!(!view.can_confirm);
        assert!(!view.can_reopen);
        assert!(view.notice.unwrap().contains("in_progress"));

        let director = fixture.linked_staff(Role::Director);
        let view = attendance_view(&fixture.state, racha_id, &director)
            .await
            .unwrap();
        assert!(!view.can_confirm);
        assert!(view.can_reopen);
    }

    #[tokio::test]
    async fn view_without_member_explains_how_to_fix_it() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Open);

        let view = attendance_view(&fixture.state, racha_id, &fixture.stranger())
            .await
            .unwrap();
        assert!(!view.can_confirm);
        assert_eq!(view.notice.as_deref(), Some(MEMBER_NOT_FOUND_MESSAGE));
    }
}

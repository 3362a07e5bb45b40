//! In-process store used for local runs without a database and by the test suites.

use std::{fs, path::Path, sync::Arc};

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dao::{
        models::{AttendanceEntity, MemberEntity, ProfileEntity, RachaEntity},
        racha_store::RachaStore,
        storage::{StorageError, StorageResult},
    },
    state::state_machine::{AttendanceStatus, RachaStatus},
};

/// JSON document accepted by [`MemoryRachaStore::from_seed_file`].
#[derive(Debug, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub profiles: Vec<ProfileEntity>,
    #[serde(default)]
    pub members: Vec<MemberEntity>,
    #[serde(default)]
    pub rachas: Vec<RachaEntity>,
    #[serde(default)]
    pub attendance: Vec<AttendanceEntity>,
}

#[derive(Default)]
struct Tables {
    profiles: DashMap<Uuid, ProfileEntity>,
    members: DashMap<Uuid, MemberEntity>,
    rachas: DashMap<Uuid, RachaEntity>,
    attendance: DashMap<(Uuid, Uuid), AttendanceEntity>,
}

/// [`RachaStore`] backed by concurrent hash maps.
///
/// Attendance rows are keyed by `(racha_id, member_id)`, so the uniqueness the
/// database enforces with a constraint holds structurally here.
#[derive(Clone, Default)]
pub struct MemoryRachaStore {
    tables: Arc<Tables>,
}

impl MemoryRachaStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `seed`.
    pub fn from_seed(seed: MemorySeed) -> Self {
        let store = Self::new();
        seed.profiles.into_iter().for_each(|p| store.insert_profile(p));
        seed.members.into_iter().for_each(|m| store.insert_member(m));
        seed.rachas.into_iter().for_each(|r| store.insert_racha(r));
        for record in seed.attendance {
            store
                .tables
                .attendance
                .insert((record.racha_id, record.member_id), record);
        }
        store
    }

    /// Read and parse a JSON seed file.
    pub fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let seed: MemorySeed = serde_json::from_str(&contents)?;
        Ok(Self::from_seed(seed))
    }

    /// Insert or replace a profile row.
    pub fn insert_profile(&self, profile: ProfileEntity) {
        self.tables.profiles.insert(profile.id, profile);
    }

    /// Insert or replace a member row.
    pub fn insert_member(&self, member: MemberEntity) {
        self.tables.members.insert(member.id, member);
    }

    /// Insert or replace a racha row.
    pub fn insert_racha(&self, racha: RachaEntity) {
        self.tables.rachas.insert(racha.id, racha);
    }

    /// Number of attendance rows across all rachas.
    pub fn attendance_len(&self) -> usize {
        self.tables.attendance.len()
    }
}

impl RachaStore for MemoryRachaStore {
    fn find_profile(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
        let found = self.tables.profiles.get(&user_id).map(|p| p.clone());
        Box::pin(async move { Ok(found) })
    }

    fn find_member(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
        let found = self.tables.members.get(&id).map(|m| m.clone());
        Box::pin(async move { Ok(found) })
    }

    fn find_member_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
        let found = self
            .tables
            .members
            .iter()
            .find(|m| m.email.as_deref() == Some(email.as_str()))
            .map(|m| m.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let mut members: Vec<_> = self.tables.members.iter().map(|m| m.clone()).collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Box::pin(async move { Ok(members) })
    }

    fn find_racha(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RachaEntity>>> {
        let found = self.tables.rachas.get(&id).map(|r| r.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_rachas(&self) -> BoxFuture<'static, StorageResult<Vec<RachaEntity>>> {
        let mut rachas: Vec<_> = self.tables.rachas.iter().map(|r| r.clone()).collect();
        rachas.sort_by(|a, b| b.scheduled_for.cmp(&a.scheduled_for));
        Box::pin(async move { Ok(rachas) })
    }

    fn update_racha_status(
        &self,
        id: Uuid,
        expected: RachaStatus,
        next: RachaStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let applied = match self.tables.rachas.get_mut(&id) {
            Some(mut racha) if racha.status == expected => {
                racha.status = next;
                true
            }
            _ => false,
        };
        Box::pin(async move { Ok(applied) })
    }

    fn find_attendance(
        &self,
        racha_id: Uuid,
        member_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AttendanceEntity>>> {
        let found = self
            .tables
            .attendance
            .get(&(racha_id, member_id))
            .map(|a| a.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_attendance(
        &self,
        racha_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttendanceEntity>>> {
        let records: Vec<_> = self
            .tables
            .attendance
            .iter()
            .filter(|a| a.racha_id == racha_id)
            .map(|a| a.clone())
            .collect();
        Box::pin(async move { Ok(records) })
    }

    fn upsert_attendance(
        &self,
        racha_id: Uuid,
        member_id: Uuid,
        status: AttendanceStatus,
    ) -> BoxFuture<'static, StorageResult<AttendanceEntity>> {
        let result = if self.tables.rachas.contains_key(&racha_id) {
            let record = self
                .tables
                .attendance
                .entry((racha_id, member_id))
                .and_modify(|existing| existing.status = status)
                .or_insert_with(|| AttendanceEntity {
                    id: Uuid::new_v4(),
                    racha_id,
                    member_id,
                    status,
                })
                .clone();
            Ok(record)
        } else {
            Err(StorageError::rejected(format!(
                "racha `{racha_id}` does not exist"
            )))
        };
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

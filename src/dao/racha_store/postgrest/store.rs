use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::SupabaseConfig,
    dao::{
        models::{AttendanceEntity, MemberEntity, ProfileEntity, RachaEntity},
        racha_store::RachaStore,
        storage::StorageResult,
    },
    state::state_machine::{AttendanceStatus, RachaStatus},
};

use super::error::{PostgrestError, PostgrestResult};

const PROFILES: &str = "profiles";
const MEMBERS: &str = "members";
const RACHAS: &str = "rachas";
const ATTENDANCE: &str = "racha_attendance";
const ATTENDANCE_CONFLICT_TARGET: &str = "racha_id,member_id";

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

/// [`RachaStore`] talking to a PostgREST endpoint (`{url}/rest/v1`).
#[derive(Clone)]
pub struct PostgrestRachaStore {
    client: Client,
    rest_url: Arc<str>,
    api_key: Arc<str>,
    bearer: Arc<str>,
}

impl PostgrestRachaStore {
    /// Build the HTTP client for the configured project.
    pub fn new(config: &SupabaseConfig) -> PostgrestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| PostgrestError::ClientBuilder { source })?;

        Ok(Self {
            client,
            rest_url: Arc::from(format!("{}/rest/v1", config.url)),
            api_key: Arc::from(config.anon_key.as_str()),
            bearer: Arc::from(config.data_key()),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.rest_url, table);
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.bearer.as_ref())
    }

    async fn send_rows<T>(&self, table: &str, builder: RequestBuilder) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                table: table.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PostgrestError::RequestStatus {
                table: table.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestError::DecodeResponse {
                table: table.to_string(),
                source,
            })
    }

    async fn select<T>(&self, table: &str, filters: &[(&str, String)]) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(filters);
        self.send_rows(table, builder).await
    }

    async fn select_one<T>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> PostgrestResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::GET, table)
            .query(&[("select", "*"), ("limit", "1")])
            .query(filters);
        Ok(self.send_rows(table, builder).await?.into_iter().next())
    }

    async fn write<T, B>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        prefer: &str,
        body: &B,
    ) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: ?Sized + Serialize,
    {
        let builder = self
            .request(method, table)
            .query(query)
            .header("Prefer", prefer)
            .json(body);
        self.send_rows(table, builder).await
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

impl RachaStore for PostgrestRachaStore {
    fn find_profile(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one(PROFILES, &[("id", eq(user_id))])
                .await
                .map_err(Into::into)
        })
    }

    fn find_member(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one(MEMBERS, &[("id", eq(id))])
                .await
                .map_err(Into::into)
        })
    }

    fn find_member_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one(MEMBERS, &[("email", eq(email))])
                .await
                .map_err(Into::into)
        })
    }

    fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select(MEMBERS, &[("order", "name.asc".to_string())])
                .await
                .map_err(Into::into)
        })
    }

    fn find_racha(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RachaEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one(RACHAS, &[("id", eq(id))])
                .await
                .map_err(Into::into)
        })
    }

    fn list_rachas(&self) -> BoxFuture<'static, StorageResult<Vec<RachaEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select(RACHAS, &[("order", "scheduled_for.desc.nullslast".to_string())])
                .await
                .map_err(Into::into)
        })
    }

    fn update_racha_status(
        &self,
        id: Uuid,
        expected: RachaStatus,
        next: RachaStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<RachaEntity> = store
                .write(
                    Method::PATCH,
                    RACHAS,
                    &[("id", eq(id)), ("status", eq(expected.as_str()))],
                    PREFER_REPRESENTATION,
                    &json!({ "status": next }),
                )
                .await?;
            Ok(!rows.is_empty())
        })
    }

    fn find_attendance(
        &self,
        racha_id: Uuid,
        member_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AttendanceEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one(
                    ATTENDANCE,
                    &[("racha_id", eq(racha_id)), ("member_id", eq(member_id))],
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_attendance(
        &self,
        racha_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttendanceEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select(ATTENDANCE, &[("racha_id", eq(racha_id))])
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_attendance(
        &self,
        racha_id: Uuid,
        member_id: Uuid,
        status: AttendanceStatus,
    ) -> BoxFuture<'static, StorageResult<AttendanceEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<AttendanceEntity> = store
                .write(
                    Method::POST,
                    ATTENDANCE,
                    &[("on_conflict", ATTENDANCE_CONFLICT_TARGET.to_string())],
                    PREFER_UPSERT,
                    &json!([{
                        "racha_id": racha_id,
                        "member_id": member_id,
                        "status": status,
                    }]),
                )
                .await?;

            rows.into_iter().next().ok_or_else(|| {
                PostgrestError::EmptyRepresentation {
                    table: ATTENDANCE.to_string(),
                }
                .into()
            })
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let builder = store
                .request(Method::GET, RACHAS)
                .query(&[("select", "id"), ("limit", "1")]);
            store
                .send_rows::<serde_json::Value>(RACHAS, builder)
                .await
                .map(|_| ())
                .map_err(Into::into)
        })
    }
}

/// Attendance confirmation for signed-in members.
pub mod attendance_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Admin start/reopen actions.
pub mod lifecycle_service;
/// Self-service profile lookup.
pub mod profile_service;
/// Read-only racha and roster projections.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use uuid::Uuid;

    use crate::{
        dao::{
            models::{MemberEntity, ProfileEntity, RachaEntity},
            racha_store::{RachaStore, memory::MemoryRachaStore},
        },
        gate::{Caller, MissingConfigPolicy, RequestGate, Role, RouteTable},
        identity::Identity,
        state::{AppState, SharedState, state_machine::RachaStatus},
    };

    /// App state over an in-memory store the test can still reach directly.
    pub(crate) struct Fixture {
        pub(crate) state: SharedState,
        pub(crate) store: MemoryRachaStore,
    }

    impl Fixture {
        pub(crate) fn new() -> Self {
            Self::wrapping(|store| Arc::new(store) as Arc<dyn RachaStore>)
        }

        /// Serve the app through `wrap(store)` while seeding and inspecting `store`.
        pub(crate) fn wrapping(wrap: impl FnOnce(MemoryRachaStore) -> Arc<dyn RachaStore>) -> Self {
            let store = MemoryRachaStore::new();
            let gate = RequestGate::new(None, RouteTable::default(), MissingConfigPolicy::Allow);
            let state = AppState::new(wrap(store.clone()), gate);
            Self { state, store }
        }

        pub(crate) fn racha(&self, status: RachaStatus) -> Uuid {
            let id = Uuid::new_v4();
            self.store.insert_racha(RachaEntity {
                id,
                status,
                title: Some("Racha de quinta".into()),
                scheduled_for: None,
            });
            id
        }

        pub(crate) async fn status_of(&self, racha_id: Uuid) -> RachaStatus {
            self.store
                .find_racha(racha_id)
                .await
                .unwrap()
                .expect("racha exists")
                .status
        }

        pub(crate) fn member(&self, name: &str, email: Option<&str>) -> Uuid {
            let id = Uuid::new_v4();
            self.store.insert_member(MemberEntity {
                id,
                name: name.into(),
                email: email.map(Into::into),
            });
            id
        }

        fn account(&self, role: Option<&str>, member_id: Option<Uuid>, email: &str) -> Caller {
            let identity = Identity {
                user_id: Uuid::new_v4(),
                email: Some(email.into()),
            };
            self.store.insert_profile(ProfileEntity {
                id: identity.user_id,
                role: role.map(Into::into),
                member_id,
            });
            Caller {
                identity,
                role: None,
            }
        }

        /// Player whose profile links straight to a member.
        pub(crate) fn linked_player(&self) -> (Caller, Uuid) {
            let member_id = self.member("Bruno", None);
            (
                self.account(None, Some(member_id), "bruno@example.com"),
                member_id,
            )
        }

        /// Staff account with a linked member.
        pub(crate) fn linked_staff(&self, role: Role) -> Caller {
            let column = match role {
                Role::Admin => "admin",
                Role::Director => "director",
                Role::None => "none",
            };
            let member_id = self.member("Diretor", None);
            self.account(Some(column), Some(member_id), "diretor@example.com")
        }

        /// Player without a profile link, matched through the roster email.
        pub(crate) fn player_by_email(&self) -> (Caller, Uuid) {
            let member_id = self.member("Carla", Some("carla@example.com"));
            (self.account(None, None, "carla@example.com"), member_id)
        }

        /// Account that maps to no member at all.
        pub(crate) fn stranger(&self) -> Caller {
            self.account(None, None, "ninguem@example.com")
        }
    }

    /// Caller as attached by the gate on admin paths.
    pub(crate) fn staff(role: Role) -> Caller {
        Caller {
            identity: Identity {
                user_id: Uuid::new_v4(),
                email: None,
            },
            role: Some(role),
        }
    }
}

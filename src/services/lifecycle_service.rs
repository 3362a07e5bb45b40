//! Admin-driven racha status changes. Role checks happen in the gate (these
//! operations live under the admin root); the confirmation flag is validated on the
//! request body before the service is reached.

use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::racha::TransitionResponse,
    error::ServiceError,
    gate::Caller,
    state::{SharedState, state_machine::RachaEvent, transitions::run_transition_with_broadcast},
};

/// Move an open racha to `in_progress`, freezing its roster.
pub async fn start_racha(
    state: &SharedState,
    racha_id: Uuid,
    caller: &Caller,
) -> Result<TransitionResponse, ServiceError> {
    transition(state, racha_id, caller, RachaEvent::Start).await
}

/// Send a racha back to `open`, whatever its current status.
pub async fn reopen_racha(
    state: &SharedState,
    racha_id: Uuid,
    caller: &Caller,
) -> Result<TransitionResponse, ServiceError> {
    transition(state, racha_id, caller, RachaEvent::Reopen).await
}

async fn transition(
    state: &SharedState,
    racha_id: Uuid,
    caller: &Caller,
    event: RachaEvent,
) -> Result<TransitionResponse, ServiceError> {
    debug!(
        %racha_id,
        user_id = %caller.identity.user_id,
        role = ?caller.role,
        ?event,
        "admin transition requested"
    );
    let (racha, plan) = run_transition_with_broadcast(state, racha_id, event).await?;
    Ok(TransitionResponse {
        racha: racha.into(),
        previous: plan.from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gate::Role,
        services::fixtures::{Fixture, staff},
        state::state_machine::RachaStatus,
    };

    #[tokio::test]
    async fn start_moves_open_racha_in_progress() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Open);
        let mut events = fixture.state.events().subscribe();

        let response = start_racha(&fixture.state, racha_id, &staff(Role::Admin))
            .await
            .unwrap();

        assert_eq!(response.previous, RachaStatus::Open);
        assert_eq!(response.racha.status, RachaStatus::InProgress);
        assert_eq!(fixture.status_of(racha_id).await, RachaStatus::InProgress);

        let event = events.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("racha.status_changed"));
        assert!(event.data.contains("\"to\":\"in_progress\""));
    }

    #[tokio::test]
    async fn start_outside_open_is_rejected_without_write() {
        let fixture = Fixture::new();
        let racha_id = fixture.racha(RachaStatus::Closed);

        let err = start_racha(&fixture.state, racha_id, &staff(Role::Director))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)), "{err:?}");
        assert_eq!(fixture.status_of(racha_id).await, RachaStatus::Closed);
    }

    #[tokio::test]
    async fn reopen_returns_any_status_to_open() {
        let fixture = Fixture::new();
        for status in [
            RachaStatus::Open,
            RachaStatus::InProgress,
            RachaStatus::Closed,
        ] {
            let racha_id = fixture.racha(status);
            let response = reopen_racha(&fixture.state, racha_id, &staff(Role::Admin))
                .await
                .unwrap();
            assert_eq!(response.previous, status);
            assert_eq!(fixture.status_of(racha_id).await, RachaStatus::Open);
        }
    }

    #[tokio::test]
    async fn unknown_racha_is_not_found() {
        let fixture = Fixture::new();
        let err = reopen_racha(&fixture.state, Uuid::new_v4(), &staff(Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::RachaEntity,
    error::ServiceError,
    services::sse_events::broadcast_status_changed,
    state::{
        SharedState,
        state_machine::{Plan, RachaEvent, plan},
    },
};

/// Plan `event` against the stored status, persist it conditionally, then broadcast
/// the change. Returns the updated racha and the applied plan.
pub async fn run_transition_with_broadcast(
    state: &SharedState,
    racha_id: Uuid,
    event: RachaEvent,
) -> Result<(RachaEntity, Plan), ServiceError> {
    let store = state.store();
    let mut racha = store
        .find_racha(racha_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("racha `{racha_id}` not found")))?;

    let plan = plan(racha.status, event)?;

    let applied = store
        .update_racha_status(racha_id, plan.from, plan.to)
        .await?;
    if !applied {
        return Err(ServiceError::Persistence(format!(
            "status of racha `{racha_id}` was not updated (expected {} before {event:?})",
            plan.from
        )));
    }

    info!(%racha_id, from = %plan.from, to = %plan.to, ?event, "racha status changed");
    racha.status = plan.to;
    broadcast_status_changed(state, racha_id, &plan);
    Ok((racha, plan))
}

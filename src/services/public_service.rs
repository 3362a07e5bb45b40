//! Service helpers that expose read-only projections of rachas and the roster.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dto::racha::{MemberSummary, RachaDetail, RachaSummary},
    error::ServiceError,
    state::{SharedState, state_machine::AttendanceStatus},
};

/// Return every racha, most recent first.
pub async fn list_rachas(state: &SharedState) -> Result<Vec<RachaSummary>, ServiceError> {
    let rachas = state.store().list_rachas().await?;
    Ok(rachas.into_iter().map(RachaSummary::from).collect())
}

/// Return a racha with its roster split into confirmed and declined members.
pub async fn racha_detail(
    state: &SharedState,
    racha_id: Uuid,
) -> Result<RachaDetail, ServiceError> {
    let store = state.store();
    let racha = store
        .find_racha(racha_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("racha `{racha_id}` not found")))?;

    let attendance = store.list_attendance(racha_id).await?;
    let members: HashMap<Uuid, MemberSummary> = store
        .list_members()
        .await?
        .into_iter()
        .map(|member| (member.id, MemberSummary::from(member)))
        .collect();

    let mut confirmed = Vec::new();
    let mut declined = Vec::new();
    for record in attendance {
        // rows pointing at removed members are skipped
        let Some(member) = members.get(&record.member_id) else {
            continue;
        };
        match record.status {
            AttendanceStatus::In => confirmed.push(member.clone()),
            AttendanceStatus::Out => declined.push(member.clone()),
        }
    }
    confirmed.sort_by(|a, b| a.name.cmp(&b.name));
    declined.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(RachaDetail {
        racha: racha.into(),
        confirmed_count: confirmed.len(),
        declined_count: declined.len(),
        confirmed,
        declined,
    })
}

/// Return the member directory ordered by name.
pub async fn list_members(state: &SharedState) -> Result<Vec<MemberSummary>, ServiceError> {
    let members = state.store().list_members().await?;
    Ok(members.into_iter().map(MemberSummary::from).collect())
}

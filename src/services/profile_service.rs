use crate::{
    dto::{profile::ProfileResponse, racha::MemberSummary},
    error::ServiceError,
    gate::{Caller, Role},
    services::attendance_service::resolve_member_id,
    state::SharedState,
};

/// Describe the caller's own account: role and the roster entry it plays as.
pub async fn my_profile(
    state: &SharedState,
    caller: &Caller,
) -> Result<ProfileResponse, ServiceError> {
    let store = state.store();
    let profile = store.find_profile(caller.identity.user_id).await?;
    let role = profile
        .as_ref()
        .map(|profile| profile.role())
        .unwrap_or(Role::None);

    let member_id = resolve_member_id(store.as_ref(), &caller.identity, profile.as_ref()).await?;
    let member = match member_id {
        Some(member_id) => store.find_member(member_id).await?.map(MemberSummary::from),
        None => None,
    };

    Ok(ProfileResponse {
        user_id: caller.identity.user_id,
        email: caller.identity.email.clone(),
        role,
        member,
    })
}

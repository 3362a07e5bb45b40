//! Validation helpers for DTOs.

use validator::ValidationError;

/// Admin transitions must be explicitly confirmed by the caller.
pub fn validate_confirmed(confirm: &bool) -> Result<(), ValidationError> {
    if *confirm {
        return Ok(());
    }

    let mut err = ValidationError::new("confirmation_required");
    err.message = Some("set `confirm` to true to apply this change".into());
    Err(err)
}

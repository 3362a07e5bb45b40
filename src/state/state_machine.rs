use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status persisted in `rachas.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RachaStatus {
    /// Members can confirm or decline attendance.
    Open,
    /// The match has started; the roster is frozen.
    InProgress,
    /// Terminal status set outside this service.
    Closed,
}

impl RachaStatus {
    /// Whether attendance can still be recorded.
    pub fn accepts_attendance(self) -> bool {
        matches!(self, RachaStatus::Open)
    }

    /// Column value used by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            RachaStatus::Open => "open",
            RachaStatus::InProgress => "in_progress",
            RachaStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for RachaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member's declared intent for a racha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Will play.
    In,
    /// Will not play.
    Out,
}

impl AttendanceStatus {
    /// Column value used by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::In => "in",
            AttendanceStatus::Out => "out",
        }
    }
}

/// Admin actions that move a racha between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RachaEvent {
    /// Freeze the roster and kick off the match.
    Start,
    /// Send the racha back to the confirmation phase.
    Reopen,
}

/// Error returned when an event cannot be applied from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {from}")]
pub struct InvalidTransition {
    /// Status the racha was in when the event was received.
    pub from: RachaStatus,
    /// The rejected event.
    pub event: RachaEvent,
}

/// A validated transition that still has to be persisted.
///
/// The store applies it conditionally on `from` so a concurrent change makes the
/// write miss instead of clobbering the newer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Status observed when planning.
    pub from: RachaStatus,
    /// Status to write.
    pub to: RachaStatus,
    /// Event that triggered the plan.
    pub event: RachaEvent,
}

/// Compute the transition triggered by `event` from `from`.
pub fn plan(from: RachaStatus, event: RachaEvent) -> Result<Plan, InvalidTransition> {
    let to = match (from, event) {
        (RachaStatus::Open, RachaEvent::Start) => RachaStatus::InProgress,
        (_, RachaEvent::Reopen) => RachaStatus::Open,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(Plan { from, to, event })
}

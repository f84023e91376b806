//! Purchase-request status state machine.
//!
//! A request starts `Pending` and leaves that state exactly once, when the
//! holder of its response token submits an action. Every mutating entry point
//! consults [`transition`] instead of comparing status strings ad hoc.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a purchase request.
///
/// Serialized with the display names used by the dashboard and stored in the
/// `status` column (`"Need Info"` contains a space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Approved,
    Rejected,
    #[serde(rename = "Need Info")]
    NeedInfo,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Confirmed,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::NeedInfo,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Confirmed => "Confirmed",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::NeedInfo => "Need Info",
        }
    }

    /// Every non-pending status retires the response token.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid status '{s}'")))
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// ResponseAction
// ---------------------------------------------------------------------------

/// Action submitted through the public response link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
    Confirm,
    Approve,
    Reject,
    NeedInfo,
}

impl ResponseAction {
    pub const ALL: [ResponseAction; 4] = [
        ResponseAction::Confirm,
        ResponseAction::Approve,
        ResponseAction::Reject,
        ResponseAction::NeedInfo,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ResponseAction::Confirm => "confirm",
            ResponseAction::Approve => "approve",
            ResponseAction::Reject => "reject",
            ResponseAction::NeedInfo => "needinfo",
        }
    }

    /// Status a pending request moves to when this action is applied.
    pub const fn target_status(self) -> RequestStatus {
        match self {
            ResponseAction::Confirm => RequestStatus::Confirmed,
            ResponseAction::Approve => RequestStatus::Approved,
            ResponseAction::Reject => RequestStatus::Rejected,
            ResponseAction::NeedInfo => RequestStatus::NeedInfo,
        }
    }
}

impl fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResponseAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CoreError::InvalidAction(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Validate a response against the current state of a request.
///
/// Checks run in this order: the token must still be live, the action must be
/// known, and the request must still be pending. Returns the parsed action and
/// the status the request moves to.
pub fn transition(
    current: RequestStatus,
    token_used: bool,
    action: Option<&str>,
) -> Result<(ResponseAction, RequestStatus), CoreError> {
    if token_used {
        return Err(CoreError::TokenAlreadyUsed);
    }

    let action: ResponseAction = action.unwrap_or_default().parse()?;

    if current.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Request is already {current}"
        )));
    }

    Ok((action, action.target_status()))
}

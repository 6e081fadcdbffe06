//! Status transitions
//!
//! Every status change goes through [`next_status`], which rejects any
//! source/action pair not in the table below.
//!
//! | from               | action        | to                      |
//! |--------------------|---------------|-------------------------|
//! | new                | assign        | assigned                |
//! | assigned           | unassign      | new                     |
//! | assigned           | complete      | waiting_for_client      |
//! | waiting_for_client | confirm       | delivered / assigned    |
//! | assigned           | report        | disputed                |
//! | waiting_for_client | report        | disputed                |
//! | disputed           | resolve       | waiting_for_client      |

use crate::error::{AppError, Result};
use crate::models::DeliveryStatus;

/// Whether a confirmation covered every ordered unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Full,
    Partial,
}

/// A status-changing action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Assign,
    Unassign,
    Complete,
    Confirm(ConfirmOutcome),
    ReportProblem,
    ResolveProblem,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Assign => "assign",
            Action::Unassign => "unassign",
            Action::Complete => "complete",
            Action::Confirm(_) => "confirm",
            Action::ReportProblem => "report problem",
            Action::ResolveProblem => "resolve problem",
        }
    }
}

/// Status reached by applying `action` in `from`, or `Conflict`
pub fn next_status(from: DeliveryStatus, action: Action) -> Result<DeliveryStatus> {
    use crate::models::DeliveryStatus::*;

    let to = match (from, action) {
        (New, Action::Assign) => Assigned,
        (Assigned, Action::Unassign) => New,
        (Assigned, Action::Complete) => WaitingForClient,
        (WaitingForClient, Action::Confirm(ConfirmOutcome::Full)) => Delivered,
        (WaitingForClient, Action::Confirm(ConfirmOutcome::Partial)) => Assigned,
        (Assigned | WaitingForClient, Action::ReportProblem) => Disputed,
        (Disputed, Action::ResolveProblem) => WaitingForClient,
        _ => {
            return Err(AppError::Conflict(format!(
                "Cannot {} a delivery that is {}",
                action.as_str(),
                from
            )))
        }
    };

    Ok(to)
}

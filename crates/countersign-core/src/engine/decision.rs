//! Checks applied to a decision once its document is loaded.
//!
//! These run inside the storage transaction, between load and persist, in
//! the order: finalized, actor known, capability, then the state machine.

use jiff::Timestamp;

use crate::{
    error::{ApprovalError, Result},
    ledger::StepDecision,
    machine::{self, Transition},
    models::{Actor, DecisionRequest, Document},
    policy,
};

/// Applies `request` to a loaded document.
///
/// `actor` is `None` when the acting user is not registered. The step decided
/// is `request.expected_step` when given, otherwise the current step; a stale
/// expectation fails in the machine's order check.
///
/// # Errors
///
/// * `ApprovalError::AlreadyFinalized` - the document is terminal
/// * `ApprovalError::Forbidden` - unknown actor, wrong role or assignee, or
///   not the step's turn
/// * `ApprovalError::AlreadyDecided` - the expected step was decided already
pub fn apply_decision(
    document: &mut Document,
    actor: Option<&Actor>,
    request: &DecisionRequest,
    at: Timestamp,
) -> Result<Transition> {
    if document.status.is_terminal() {
        return Err(ApprovalError::AlreadyFinalized {
            id: document.id,
            status: document.status,
        });
    }

    let actor = *actor.ok_or_else(|| {
        ApprovalError::forbidden(format!("User {} is not registered", request.actor_id))
    })?;

    let step_number = request.expected_step.unwrap_or(document.current_step);
    if step_number == document.current_step {
        if let Some(step) = document.current_flow_step() {
            policy::authorize(&actor, step)?;
        }
    }

    machine::advance(
        document,
        step_number,
        StepDecision {
            actor,
            decision: request.decision,
            remarks: request.remarks.clone(),
            at,
        },
    )
}

//! Tracking ledger: write-once recording of step decisions.

use jiff::Timestamp;

use crate::{
    error::{ApprovalError, Result},
    models::{Actor, Decision, FlowStep, TrackingEntry},
    policy,
};

/// A decision about to be written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDecision {
    pub actor: Actor,
    pub decision: Decision,
    pub remarks: Option<String>,
    pub at: Timestamp,
}

/// Fills the tracking entry for `step` with `input`.
///
/// The entry must exist and still be undecided, and the actor must pass the
/// capability check for the step. On success the entry's decision fields are
/// set together; on failure nothing is touched. There is no way to clear or
/// overwrite a recorded decision.
///
/// # Errors
///
/// * `ApprovalError::Inconsistent` - no entry exists for the step
/// * `ApprovalError::AlreadyDecided` - the entry already carries a decision
/// * `ApprovalError::Forbidden` - the actor may not decide this step
pub fn record_decision<'a>(
    document_id: u64,
    entries: &'a mut [TrackingEntry],
    step: &FlowStep,
    input: &StepDecision,
) -> Result<&'a TrackingEntry> {
    let entry = entries
        .iter_mut()
        .find(|e| e.step_number == step.position)
        .ok_or_else(|| ApprovalError::Inconsistent {
            id: document_id,
            reason: format!("no tracking entry for step {}", step.position),
        })?;

    if entry.is_decided() {
        return Err(ApprovalError::AlreadyDecided {
            id: document_id,
            step: step.position,
        });
    }

    policy::authorize(&input.actor, step)?;

    entry.action = Some(input.decision);
    entry.handled_by = Some(input.actor.id);
    entry.acted_at = Some(input.at);
    entry.remarks = input.remarks.clone();

    Ok(entry)
}

//! Document state machine.
//!
//! A document is `pending` while some step awaits a decision, `approved` once
//! every step approved, and `rejected` as soon as any step rejects. Both
//! terminal states absorb: no later decision is accepted.
//!
//! ```text
//!            approve (k < N)
//!          ┌───────────────┐
//!          ▼               │
//!     ┌─────────┐──────────┘   approve (k = N)   ┌──────────┐
//!     │ pending │─────────────────────────────────▶│ approved │
//!     └─────────┘                                  └──────────┘
//!          │ reject (any k)                        ┌──────────┐
//!          └──────────────────────────────────────▶│ rejected │
//!                                                  └──────────┘
//! ```
//!
//! Status and `current_step` are always recomputable from the ledger via
//! [`derive_status`]; [`check_consistency`] compares the stored values with
//! that derivation.

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    error::{ApprovalError, Result},
    ledger::{self, StepDecision},
    models::{Decision, Document, DocumentStatus, TrackingEntry},
};

/// What a successful [`advance`] changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub document_id: u64,
    pub step_number: u32,
    pub decision: Decision,
    pub actor_id: u64,
    pub remarks: Option<String>,
    pub from: DocumentStatus,
    pub to: DocumentStatus,
    /// Step now awaiting a decision; `None` when the document is terminal
    pub next_step: Option<u32>,
    pub at: Timestamp,
}

/// Applies a decision on `step_number` to the document.
///
/// # Errors
///
/// * `ApprovalError::AlreadyFinalized` - the document is approved or rejected
/// * `ApprovalError::AlreadyDecided` - the step lies behind the current step
/// * `ApprovalError::Forbidden` - the step lies ahead of the current step, or
///   the actor may not decide it
pub fn advance(document: &mut Document, step_number: u32, input: StepDecision) -> Result<Transition> {
    if document.status.is_terminal() {
        return Err(ApprovalError::AlreadyFinalized {
            id: document.id,
            status: document.status,
        });
    }

    if step_number != document.current_step {
        let behind = step_number < document.current_step
            && document
                .tracking_entry(step_number)
                .is_some_and(TrackingEntry::is_decided);
        return Err(if behind {
            ApprovalError::AlreadyDecided {
                id: document.id,
                step: step_number,
            }
        } else {
            ApprovalError::forbidden(format!(
                "Not your turn: step {step_number} requested while step {} awaits a decision",
                document.current_step
            ))
        });
    }

    let step = *document
        .step_flow
        .step(step_number)
        .ok_or_else(|| ApprovalError::Inconsistent {
            id: document.id,
            reason: format!("current step {step_number} is outside the flow"),
        })?;

    ledger::record_decision(document.id, &mut document.tracking, &step, &input)?;

    let from = document.status;
    match input.decision {
        Decision::Rejected => document.status = DocumentStatus::Rejected,
        Decision::Approved => {
            document.current_step += 1;
            if document.current_step > document.step_flow.len() {
                document.status = DocumentStatus::Approved;
            }
        }
    }
    document.updated_at = input.at;

    Ok(Transition {
        document_id: document.id,
        step_number,
        decision: input.decision,
        actor_id: input.actor.id,
        remarks: input.remarks,
        from,
        to: document.status,
        next_step: (!document.status.is_terminal()).then_some(document.current_step),
        at: input.at,
    })
}

/// Recomputes `(status, current_step)` from the ledger alone.
///
/// Entries are read in step order. The first rejection fixes the status at
/// `rejected` with the pointer on the rejecting step; otherwise the pointer
/// sits just past the run of approvals.
pub fn derive_status(flow_len: u32, entries: &[TrackingEntry]) -> (DocumentStatus, u32) {
    let mut ordered: Vec<&TrackingEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.step_number);

    let mut approved = 0;
    for entry in ordered {
        match entry.action {
            Some(Decision::Rejected) => return (DocumentStatus::Rejected, entry.step_number),
            Some(Decision::Approved) => approved += 1,
            None => break,
        }
    }

    if flow_len > 0 && approved >= flow_len {
        (DocumentStatus::Approved, flow_len + 1)
    } else {
        (DocumentStatus::Pending, approved + 1)
    }
}

/// Verifies a loaded document against its own ledger.
///
/// # Errors
///
/// Returns `ApprovalError::Inconsistent` when the ledger does not cover the
/// flow one-to-one, a decision sits past an open step, or the stored status
/// or pointer differs from [`derive_status`].
pub fn check_consistency(document: &Document) -> Result<()> {
    let inconsistent = |reason: String| ApprovalError::Inconsistent {
        id: document.id,
        reason,
    };

    let flow_len = document.step_flow.len();
    if document.tracking.len() as u32 != flow_len {
        return Err(inconsistent(format!(
            "{} tracking entries for a {flow_len}-step flow",
            document.tracking.len()
        )));
    }
    for step in &document.step_flow {
        let entry = document
            .tracking_entry(step.position)
            .ok_or_else(|| inconsistent(format!("no tracking entry for step {}", step.position)))?;
        if entry.role != step.role {
            return Err(inconsistent(format!(
                "tracking entry for step {} records role {} but the flow requires {}",
                step.position,
                entry.role.as_str(),
                step.role.as_str()
            )));
        }
    }

    let (status, current_step) = derive_status(flow_len, &document.tracking);
    if let Some(stray) = document
        .tracking
        .iter()
        .find(|e| e.is_decided() && e.step_number > current_step)
    {
        return Err(inconsistent(format!(
            "step {} is decided while step {current_step} is open",
            stray.step_number
        )));
    }
    if status != document.status || current_step != document.current_step {
        return Err(inconsistent(format!(
            "stored {}/step {} but ledger implies {}/step {current_step}",
            document.status.as_str(),
            document.current_step,
            status.as_str()
        )));
    }

    Ok(())
}

//! Tracking entry model: the write-once record of one step's outcome.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Decision, Role};

/// Ledger row for a single approval step.
///
/// Created undecided alongside the document. The decision fields
/// (`handled_by`, `action`, `remarks`, `acted_at`) are filled exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingEntry {
    /// Unique identifier for the entry
    pub id: u64,

    /// ID of the owning document
    pub document_id: u64,

    /// 1-based step this entry records
    pub step_number: u32,

    /// Role expected to act on the step
    pub role: Role,

    /// User who decided the step
    pub handled_by: Option<u64>,

    /// Recorded decision, `None` while the step is open
    pub action: Option<Decision>,

    /// Free-form remarks supplied with the decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    /// When the decision was recorded (UTC)
    pub acted_at: Option<Timestamp>,
}

impl TrackingEntry {
    /// Creates an undecided entry for a step.
    pub fn open(document_id: u64, step_number: u32, role: Role) -> Self {
        Self {
            id: 0,
            document_id,
            step_number,
            role,
            handled_by: None,
            action: None,
            remarks: None,
            acted_at: None,
        }
    }

    /// Whether a decision has been recorded.
    pub fn is_decided(&self) -> bool {
        self.action.is_some()
    }
}

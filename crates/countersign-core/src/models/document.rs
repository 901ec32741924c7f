//! Document model definition and related functionality.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DocumentKind, DocumentStatus, EntryType, FlowStep, StepFlow, TrackingEntry};

/// A disbursement or journal routed through the approval chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document
    pub id: u64,

    /// Disbursement or journal
    pub kind: DocumentKind,

    /// Human-readable identifier, `PREFIX-YY-RANDOM6`
    pub control_number: String,

    /// Title of the document
    pub title: String,

    /// Detailed multi-line description
    pub description: Option<String>,

    /// Status derived from the tracking ledger
    pub status: DocumentStatus,

    /// 1-based index of the step awaiting a decision; `len + 1` once approved
    pub current_step: u32,

    /// Bumped on every committed decision
    pub version: u64,

    /// ID of the user who raised the document
    pub created_by: u64,

    /// Timestamp when the document was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the document was last modified (UTC)
    pub updated_at: Timestamp,

    /// Accounting lines, ordered by `order_number`
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Ordered approvers
    pub step_flow: StepFlow,

    /// One entry per step, ordered by step number
    #[serde(default)]
    pub tracking: Vec<TrackingEntry>,

    /// Supporting files
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Document {
    /// The step awaiting a decision, if the document is still pending.
    pub fn current_flow_step(&self) -> Option<&FlowStep> {
        if self.status.is_terminal() {
            return None;
        }
        self.step_flow.step(self.current_step)
    }

    /// Tracking entry recorded for a 1-based step number.
    pub fn tracking_entry(&self, step_number: u32) -> Option<&TrackingEntry> {
        self.tracking.iter().find(|e| e.step_number == step_number)
    }

    /// Sum of the debit lines.
    pub fn total_debits(&self) -> Decimal {
        sum_side(&self.line_items, EntryType::Debit)
    }

    /// Sum of the credit lines.
    pub fn total_credits(&self) -> Decimal {
        sum_side(&self.line_items, EntryType::Credit)
    }
}

fn sum_side(items: &[LineItem], side: EntryType) -> Decimal {
    items
        .iter()
        .filter(|item| item.entry_type == side)
        .map(|item| item.amount)
        .sum()
}

/// A single debit or credit line on a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Unique identifier for the line
    pub id: u64,

    /// ID of the owning document
    pub document_id: u64,

    /// Account the amount is posted to
    pub account_id: u64,

    /// Debit or credit
    pub entry_type: EntryType,

    /// Positive amount with at most two decimal places
    pub amount: Decimal,

    /// Optional line narrative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display ordering, unique within the document
    pub order_number: u32,
}

/// A file attached to a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: u64,
    pub document_id: u64,
    /// Path relative to the attachment store root
    pub file_path: String,
    pub file_name: String,
    pub file_type: String,
    pub created_at: Timestamp,
}

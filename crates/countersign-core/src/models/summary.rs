//! Document summary types for list views.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Document, DocumentKind, DocumentStatus, Role};

/// Summary information about a document with approval progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    /// Document ID
    pub id: u64,
    /// Disbursement or journal
    pub kind: DocumentKind,
    /// Human-readable identifier
    pub control_number: String,
    /// Title of the document
    pub title: String,
    /// Document status
    pub status: DocumentStatus,
    /// Step awaiting a decision
    pub current_step: u32,
    /// Total number of steps
    pub total_steps: u32,
    /// Role expected to act next, if pending
    pub awaiting_role: Option<Role>,
    /// Sum of debit lines
    pub total_amount: Decimal,
    /// Creation timestamp
    pub created_at: Timestamp,
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            kind: document.kind,
            control_number: document.control_number.clone(),
            title: document.title.clone(),
            status: document.status,
            current_step: document.current_step,
            total_steps: document.step_flow.len(),
            awaiting_role: document.current_flow_step().map(|step| step.role),
            total_amount: document.total_debits(),
            created_at: document.created_at,
        }
    }
}

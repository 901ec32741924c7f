//! Enumerations for document status, decisions, roles and ledger sides.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a document under approval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// At least one step is still waiting for a decision
    #[default]
    Pending,

    /// Every step approved
    Approved,

    /// Some step rejected; no further step may act
    Rejected,
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            _ => Err(format!("Invalid document status: {s}")),
        }
    }
}

impl DocumentStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    /// Approved and rejected documents accept no further decisions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DocumentStatus::Pending)
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// ```rust
    /// use countersign_core::models::DocumentStatus;
    ///
    /// assert_eq!(DocumentStatus::Approved.with_icon(), "✓ Approved");
    /// assert_eq!(DocumentStatus::Rejected.with_icon(), "✗ Rejected");
    /// assert_eq!(DocumentStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            DocumentStatus::Approved => "✓ Approved",
            DocumentStatus::Rejected => "✗ Rejected",
            DocumentStatus::Pending => "○ Pending",
        }
    }
}

/// Outcome recorded against a single approval step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" | "approve" => Ok(Decision::Approved),
            "rejected" | "reject" => Ok(Decision::Rejected),
            _ => Err(format!("Invalid decision: {s}")),
        }
    }
}

impl Decision {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

/// Approver roles, in the order the default template visits them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    AccountingAssistant,
    AccountingHead,
    Auditor,
    Svp,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "accounting_assistant" | "assistant" => Ok(Role::AccountingAssistant),
            "accounting_head" | "head" => Ok(Role::AccountingHead),
            "auditor" => Ok(Role::Auditor),
            "svp" => Ok(Role::Svp),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

impl Role {
    /// Every role, in default approval order.
    pub const ALL: [Role; 4] = [
        Role::AccountingAssistant,
        Role::AccountingHead,
        Role::Auditor,
        Role::Svp,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::AccountingAssistant => "accounting_assistant",
            Role::AccountingHead => "accounting_head",
            Role::Auditor => "auditor",
            Role::Svp => "svp",
        }
    }

    /// Human readable title.
    pub fn label(&self) -> &'static str {
        match self {
            Role::AccountingAssistant => "Accounting Assistant",
            Role::AccountingHead => "Accounting Head",
            Role::Auditor => "Auditor",
            Role::Svp => "SVP",
        }
    }
}

/// Side of a ledger line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" | "dr" => Ok(EntryType::Debit),
            "credit" | "cr" => Ok(EntryType::Credit),
            _ => Err(format!("Invalid entry type: {s}")),
        }
    }
}

impl EntryType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Debit => "debit",
            EntryType::Credit => "credit",
        }
    }
}

/// Kind of document routed through approval. Both share one structure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Disbursement,
    Journal,
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disbursement" => Ok(DocumentKind::Disbursement),
            "journal" => Ok(DocumentKind::Journal),
            _ => Err(format!("Invalid document kind: {s}")),
        }
    }
}

impl DocumentKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Disbursement => "disbursement",
            DocumentKind::Journal => "journal",
        }
    }
}

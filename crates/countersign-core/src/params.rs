//! Parameter structures for Countersign operations
//!
//! This module contains the request shapes an API or CLI layer hands to the
//! engine. They carry plain strings and numbers, free of framework derives,
//! and are converted into validated domain requests
//! ([`crate::models::NewDocument`], [`crate::models::DecisionRequest`]) before
//! any state is touched.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │  Core Params    │    │ Domain Requests │
//! │  (clap derives) │───▶│ (serde derives) │───▶│   (validated)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! JSON schemas for the parameter types are available with the `schema`
//! feature enabled.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApprovalError, Result},
    models::Decision,
};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// One accounting line on a new document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct LineItemInput {
    /// Account the amount is posted to
    pub account_id: u64,
    /// 'debit' or 'credit'
    pub entry_type: String,
    /// Positive decimal with at most two places, e.g. "1250.00"
    pub amount: String,
    /// Optional line narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display ordering; defaults to the line's 1-based position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<u32>,
}

/// Pins a specific user to a step of the template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ApproverAssignment {
    /// 1-based step position within the template
    pub position: u32,
    /// User who must decide that step
    pub user_id: u64,
}

/// Parameters for creating a new document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateDocument {
    /// 'disbursement' or 'journal'
    pub kind: String,
    /// Title of the document (required)
    pub title: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Control-number prefix code, must be configured and active
    pub prefix: String,
    /// ID of the user raising the document
    pub created_by: u64,
    /// Accounting lines; debits must equal credits
    pub line_items: Vec<LineItemInput>,
    /// Explicit approvers; unlisted steps go to any holder of the role
    #[serde(default)]
    pub approvers: Vec<ApproverAssignment>,
}

/// Parameters for deciding the current step of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Decide {
    /// Document to act on
    pub document_id: u64,
    /// ID of the acting user
    pub actor_id: u64,
    /// 'approve' or 'reject'
    pub action: String,
    /// Optional remarks stored on the tracking entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Step the caller believes is current; rejected if stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_step: Option<u32>,
}

impl Decide {
    /// Parse the action string.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - When the action is not approve/reject
    ///
    /// # Examples
    ///
    /// ```rust
    /// use countersign_core::{models::Decision, params::Decide};
    ///
    /// let params = Decide {
    ///     document_id: 1,
    ///     actor_id: 2,
    ///     action: "reject".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(params.validate()?, Decision::Rejected);
    /// # Ok::<(), countersign_core::ApprovalError>(())
    /// ```
    pub fn validate(&self) -> Result<Decision> {
        self.action.parse::<Decision>().map_err(|_| {
            ApprovalError::validation("action").with_reason(format!(
                "Invalid action: {}. Must be 'approve' or 'reject'",
                self.action
            ))
        })
    }
}

/// Parameters for listing documents. All filters are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListDocuments {
    /// 'pending', 'approved' or 'rejected'
    pub status: Option<String>,
    /// 'disbursement' or 'journal'
    pub kind: Option<String>,
    /// Only pending documents waiting on this role
    pub awaiting_role: Option<String>,
    /// Case-insensitive title substring
    pub title_contains: Option<String>,
}

/// Parameters for registering a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateUser {
    pub name: String,
    /// One of accounting_assistant, accounting_head, auditor, svp
    pub role: String,
}

/// Parameters for registering an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateAccount {
    pub code: String,
    pub name: String,
}

/// Parameters for configuring a control-number prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePrefix {
    /// Upper-case letters and digits, e.g. "DV"
    pub code: String,
    pub description: Option<String>,
}

/// Parameters for attaching a file to a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddAttachment {
    pub document_id: u64,
    /// Original file name, used for display and the stored path
    pub file_name: String,
    /// MIME type or extension
    pub file_type: String,
    /// File contents
    pub contents: Vec<u8>,
}

/// Parameters for the retention purge of rejected documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PurgeRejected {
    /// Rejected documents whose rejection is older than this are removed
    pub older_than_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_validate_accepts_both_spellings() {
        for (action, expected) in [
            ("approve", Decision::Approved),
            ("APPROVED", Decision::Approved),
            ("reject", Decision::Rejected),
            ("rejected", Decision::Rejected),
        ] {
            let params = Decide {
                action: action.to_string(),
                ..Default::default()
            };
            assert_eq!(params.validate().expect("valid action"), expected);
        }
    }

    #[test]
    fn test_decide_validate_invalid_action() {
        let params = Decide {
            document_id: 1,
            actor_id: 1,
            action: "escalate".to_string(),
            ..Default::default()
        };

        match params.validate().unwrap_err() {
            ApprovalError::Validation { field, reason } => {
                assert_eq!(field, "action");
                assert!(reason.contains("Invalid action: escalate"));
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_document_deserializes_without_approvers() {
        let json = r#"{
            "kind": "journal",
            "title": "Accrual",
            "description": null,
            "prefix": "JV",
            "created_by": 3,
            "line_items": [
                {"account_id": 1, "entry_type": "debit", "amount": "10.00"},
                {"account_id": 2, "entry_type": "credit", "amount": "10.00"}
            ]
        }"#;
        let params: CreateDocument = serde_json::from_str(json).expect("valid json");
        assert!(params.approvers.is_empty());
        assert_eq!(params.line_items.len(), 2);
        assert_eq!(params.line_items[0].order_number, None);
    }
}

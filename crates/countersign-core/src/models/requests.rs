//! Validated request types built from [`crate::params`].

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;

use super::{Decision, DocumentKind, EntryType};
use crate::error::{ApprovalError, Result};

/// A line item that passed amount and side validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub account_id: u64,
    pub entry_type: EntryType,
    /// Rescaled to exactly two decimal places
    pub amount: Decimal,
    pub description: Option<String>,
    pub order_number: u32,
}

/// A creation request whose fields parsed and whose lines balance.
///
/// References to users, accounts and prefixes are checked later against
/// storage, inside the creating transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub description: Option<String>,
    pub prefix: String,
    pub created_by: u64,
    pub line_items: Vec<NewLineItem>,
    /// Explicit approvers keyed by 1-based step position
    pub assignments: BTreeMap<u32, u64>,
}

/// A decision request with a parsed action.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRequest {
    pub document_id: u64,
    pub actor_id: u64,
    pub decision: Decision,
    pub remarks: Option<String>,
    pub expected_step: Option<u32>,
}

impl TryFrom<crate::params::Decide> for DecisionRequest {
    type Error = ApprovalError;

    fn try_from(params: crate::params::Decide) -> Result<Self> {
        let decision = params.validate()?;
        Ok(Self {
            document_id: params.document_id,
            actor_id: params.actor_id,
            decision,
            remarks: params.remarks.filter(|r| !r.trim().is_empty()),
            expected_step: params.expected_step,
        })
    }
}

impl TryFrom<crate::params::CreateDocument> for NewDocument {
    type Error = ApprovalError;

    /// Parse and validate a creation request.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - empty title, unknown kind, malformed or
    ///   non-positive amounts, duplicate order numbers, unbalanced lines, or
    ///   the same step assigned twice
    ///
    /// # Examples
    ///
    /// ```rust
    /// use countersign_core::{models::NewDocument, params::{CreateDocument, LineItemInput}};
    ///
    /// let params = CreateDocument {
    ///     kind: "disbursement".to_string(),
    ///     title: "Office rent".to_string(),
    ///     prefix: "DV".to_string(),
    ///     created_by: 1,
    ///     line_items: vec![
    ///         LineItemInput { account_id: 10, entry_type: "debit".into(), amount: "500".into(), ..Default::default() },
    ///         LineItemInput { account_id: 20, entry_type: "credit".into(), amount: "500.00".into(), ..Default::default() },
    ///     ],
    ///     ..Default::default()
    /// };
    /// let request = NewDocument::try_from(params)?;
    /// assert_eq!(request.line_items[0].amount.to_string(), "500.00");
    /// # Ok::<(), countersign_core::ApprovalError>(())
    /// ```
    fn try_from(params: crate::params::CreateDocument) -> Result<Self> {
        let title = params.title.trim().to_string();
        if title.is_empty() {
            return Err(ApprovalError::validation("title").with_reason("Title must not be empty"));
        }

        let kind = params
            .kind
            .parse::<DocumentKind>()
            .map_err(|e| ApprovalError::validation("kind").with_reason(e))?;

        let line_items = params
            .line_items
            .into_iter()
            .enumerate()
            .map(|(index, input)| parse_line_item(index, input))
            .collect::<Result<Vec<_>>>()?;
        validate_line_items(&line_items)?;

        let mut assignments = BTreeMap::new();
        for assignment in params.approvers {
            if assignments
                .insert(assignment.position, assignment.user_id)
                .is_some()
            {
                return Err(ApprovalError::validation("approvers").with_reason(format!(
                    "Step {} is assigned more than once",
                    assignment.position
                )));
            }
        }

        Ok(Self {
            kind,
            title,
            description: params.description.filter(|d| !d.trim().is_empty()),
            prefix: params.prefix.trim().to_uppercase(),
            created_by: params.created_by,
            line_items,
            assignments,
        })
    }
}

fn parse_line_item(index: usize, input: crate::params::LineItemInput) -> Result<NewLineItem> {
    let field = format!("line_items[{index}]");

    let entry_type = input
        .entry_type
        .parse::<EntryType>()
        .map_err(|e| ApprovalError::validation(&field).with_reason(e))?;

    let mut amount = input.amount.trim().parse::<Decimal>().map_err(|e| {
        ApprovalError::validation(&field)
            .with_reason(format!("Invalid amount '{}': {e}", input.amount))
    })?;
    if amount <= Decimal::ZERO {
        return Err(ApprovalError::validation(&field).with_reason("Amount must be positive"));
    }
    if amount.normalize().scale() > 2 {
        return Err(ApprovalError::validation(&field)
            .with_reason("Amount must have at most two decimal places"));
    }
    amount.rescale(2);
    if amount.scale() != 2 {
        return Err(ApprovalError::validation(&field)
            .with_reason(format!("Amount '{}' is too large", input.amount)));
    }

    Ok(NewLineItem {
        account_id: input.account_id,
        entry_type,
        amount,
        description: input.description,
        order_number: input.order_number.unwrap_or(index as u32 + 1),
    })
}

/// Checks that a set of lines is non-empty, uniquely ordered and balanced.
pub fn validate_line_items(items: &[NewLineItem]) -> Result<()> {
    if items.is_empty() {
        return Err(ApprovalError::validation("line_items")
            .with_reason("At least one line item is required"));
    }

    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.order_number) {
            return Err(ApprovalError::validation("line_items").with_reason(format!(
                "Order number {} is used more than once",
                item.order_number
            )));
        }
    }

    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for item in items {
        let total = match item.entry_type {
            EntryType::Debit => &mut debits,
            EntryType::Credit => &mut credits,
        };
        *total = total.checked_add(item.amount).ok_or_else(|| {
            ApprovalError::validation("line_items")
                .with_reason(format!("{} total overflows", item.entry_type.as_str()))
        })?;
    }
    if debits != credits {
        return Err(ApprovalError::validation("line_items").with_reason(format!(
            "Debits ({debits}) must equal credits ({credits})"
        )));
    }

    Ok(())
}

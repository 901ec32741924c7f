//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::{Account, DocumentSummary, PrefixConfig, User};

/// Newtype wrapper for displaying collections of document summaries.
///
/// # Examples
///
/// ```rust
/// use countersign_core::{
///     display::DocumentSummaries,
///     models::{DocumentKind, DocumentStatus, DocumentSummary, Role},
/// };
/// use jiff::Timestamp;
/// use rust_decimal::Decimal;
///
/// let summary = DocumentSummary {
///     id: 1,
///     kind: DocumentKind::Disbursement,
///     control_number: "DV-24-K3M9Q2".to_string(),
///     title: "Office rent".to_string(),
///     status: DocumentStatus::Pending,
///     current_step: 2,
///     total_steps: 4,
///     awaiting_role: Some(Role::AccountingHead),
///     total_amount: Decimal::new(50000, 2),
///     created_at: Timestamp::now(),
/// };
///
/// let output = DocumentSummaries(vec![summary]).to_string();
/// assert!(output.contains("DV-24-K3M9Q2"));
/// assert!(output.contains("step 2/4"));
/// ```
pub struct DocumentSummaries(pub Vec<DocumentSummary>);

impl DocumentSummaries {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of summaries in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get a reference to the summary at the given index.
    pub fn get(&self, index: usize) -> Option<&DocumentSummary> {
        self.0.get(index)
    }

    /// Get an iterator over the summaries.
    pub fn iter(&self) -> std::slice::Iter<'_, DocumentSummary> {
        self.0.iter()
    }
}

impl Index<usize> for DocumentSummaries {
    type Output = DocumentSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for DocumentSummaries {
    type Item = DocumentSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocumentSummaries {
    type Item = &'a DocumentSummary;
    type IntoIter = std::slice::Iter<'a, DocumentSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DocumentSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No documents found.")
        } else {
            for summary in &self.0 {
                write!(f, "{summary}")?;
            }
            Ok(())
        }
    }
}

/// Registered users.
pub struct Users(pub Vec<User>);

impl fmt::Display for Users {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No users found.");
        }
        for user in &self.0 {
            write!(f, "{user}")?;
        }
        Ok(())
    }
}

/// Chart of accounts.
pub struct Accounts(pub Vec<Account>);

impl fmt::Display for Accounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No accounts found.");
        }
        for account in &self.0 {
            write!(f, "{account}")?;
        }
        Ok(())
    }
}

/// Configured control-number prefixes.
pub struct Prefixes(pub Vec<PrefixConfig>);

impl fmt::Display for Prefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No prefixes configured.");
        }
        for prefix in &self.0 {
            write!(f, "{prefix}")?;
        }
        Ok(())
    }
}

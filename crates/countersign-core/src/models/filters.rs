//! Filter types for querying documents.

use super::{DocumentKind, DocumentStatus, Role};

/// Filter options for listing documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    /// Only documents in this status
    pub status: Option<DocumentStatus>,

    /// Only disbursements or only journals
    pub kind: Option<DocumentKind>,

    /// Pending documents whose current step belongs to this role.
    /// Implies `status = pending`.
    pub awaiting_role: Option<Role>,

    /// Filter by title (case-insensitive partial match)
    pub title_contains: Option<String>,
}

impl DocumentFilter {
    /// Create a filter for an approver's inbox.
    ///
    /// ```rust
    /// use countersign_core::models::{DocumentFilter, Role};
    ///
    /// let filter = DocumentFilter::awaiting(Role::Auditor);
    /// assert_eq!(filter.awaiting_role, Some(Role::Auditor));
    /// assert!(filter.status.is_none());
    /// ```
    pub fn awaiting(role: Role) -> Self {
        Self {
            awaiting_role: Some(role),
            ..Default::default()
        }
    }
}

impl TryFrom<&crate::params::ListDocuments> for DocumentFilter {
    type Error = crate::ApprovalError;

    /// Parse the string fields of `ListDocuments` into typed filters.
    ///
    /// ```rust
    /// use countersign_core::{models::{DocumentFilter, DocumentStatus}, params::ListDocuments};
    ///
    /// let params = ListDocuments {
    ///     status: Some("rejected".to_string()),
    ///     ..Default::default()
    /// };
    /// let filter = DocumentFilter::try_from(&params)?;
    /// assert_eq!(filter.status, Some(DocumentStatus::Rejected));
    /// # Ok::<(), countersign_core::ApprovalError>(())
    /// ```
    fn try_from(params: &crate::params::ListDocuments) -> Result<Self, Self::Error> {
        let status = params
            .status
            .as_deref()
            .map(str::parse::<DocumentStatus>)
            .transpose()
            .map_err(|e| crate::ApprovalError::validation("status").with_reason(e))?;
        let kind = params
            .kind
            .as_deref()
            .map(str::parse::<DocumentKind>)
            .transpose()
            .map_err(|e| crate::ApprovalError::validation("kind").with_reason(e))?;
        let awaiting_role = params
            .awaiting_role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()
            .map_err(|e| crate::ApprovalError::validation("awaiting_role").with_reason(e))?;

        Ok(Self {
            status,
            kind,
            awaiting_role,
            title_contains: params.title_contains.clone(),
        })
    }
}

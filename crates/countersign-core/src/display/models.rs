//! Display implementations for domain models.
//!
//! All output is markdown so the CLI renderer can style it; with colors off
//! it still reads as plain text.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{
    Account, Attachment, Decision, Document, DocumentKind, DocumentStatus, DocumentSummary,
    EntryType, LineItem, PrefixConfig, Role, TrackingEntry, User,
};

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} {}", self.control_number, self.title)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Kind: {}", self.kind)?;
        writeln!(f, "- Status: {}", self.status.with_icon())?;
        match self.current_flow_step() {
            Some(step) => writeln!(
                f,
                "- Awaiting: step {} of {} ({})",
                step.position,
                self.step_flow.len(),
                step.role
            )?,
            None => writeln!(f, "- Steps: {}", self.step_flow.len())?,
        }
        writeln!(f, "- Created by: user {}", self.created_by)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if !self.line_items.is_empty() {
            writeln!(f, "\n## Line Items")?;
            writeln!(f)?;
            writeln!(f, "| # | Account | Debit | Credit | Description |")?;
            writeln!(f, "|---|---|---:|---:|---|")?;
            for item in &self.line_items {
                write!(f, "{item}")?;
            }
            writeln!(
                f,
                "| | **Total** | **{}** | **{}** | |",
                self.total_debits(),
                self.total_credits()
            )?;
        }

        writeln!(f, "\n## Approval Trail")?;
        writeln!(f)?;
        for entry in &self.tracking {
            let assignee = self
                .step_flow
                .step(entry.step_number)
                .and_then(|step| step.assigned_user);
            write!(f, "{entry}")?;
            if let (Some(user), None) = (assignee, entry.action) {
                writeln!(f, "  - assigned to user {user}")?;
            }
        }

        if !self.attachments.is_empty() {
            writeln!(f, "\n## Attachments")?;
            writeln!(f)?;
            for attachment in &self.attachments {
                write!(f, "{attachment}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (debit, credit) = match self.entry_type {
            EntryType::Debit => (self.amount.to_string(), String::new()),
            EntryType::Credit => (String::new(), self.amount.to_string()),
        };
        writeln!(
            f,
            "| {} | {} | {debit} | {credit} | {} |",
            self.order_number,
            self.account_id,
            self.description.as_deref().unwrap_or("")
        )
    }
}

impl fmt::Display for TrackingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}: ", self.step_number, self.role)?;
        match (self.action, self.handled_by, &self.acted_at) {
            (Some(action), Some(user), Some(at)) => {
                let icon = match action {
                    Decision::Approved => "✓",
                    Decision::Rejected => "✗",
                };
                writeln!(f, "{icon} {action} by user {user} on {}", LocalDateTime(at))?;
            }
            (Some(action), _, _) => writeln!(f, "{action}")?,
            (None, _, _) => writeln!(f, "○ waiting")?,
        }
        if let Some(remarks) = &self.remarks {
            writeln!(f, "  > {remarks}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} ({}, ID: {}) `{}`",
            self.file_name, self.file_type, self.id, self.file_path
        )
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} {} (ID: {})",
            self.control_number, self.title, self.id
        )?;
        writeln!(f)?;
        writeln!(f, "- **Kind**: {}", self.kind)?;
        match self.awaiting_role {
            Some(role) => writeln!(
                f,
                "- **Status**: {} (step {}/{}, {role})",
                self.status.with_icon(),
                self.current_step,
                self.total_steps
            )?,
            None => writeln!(f, "- **Status**: {}", self.status.with_icon())?,
        }
        writeln!(f, "- **Amount**: {}", self.total_amount)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- {} (ID: {}) {}", self.name, self.id, self.role)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- `{}` {} (ID: {})", self.code, self.name, self.id)
    }
}

impl fmt::Display for PrefixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- `{}`", self.code)?;
        if let Some(desc) = &self.description {
            write!(f, " {desc}")?;
        }
        if !self.active {
            write!(f, " (inactive)")?;
        }
        writeln!(f)
    }
}

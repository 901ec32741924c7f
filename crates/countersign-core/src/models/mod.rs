//! Data models for documents, step flows and the tracking ledger.
//!
//! This module contains the domain models of the approval engine. Display
//! implementations live in [`crate::display::models`] so the data structures
//! stay free of presentation logic.
//!
//! # Model Overview
//!
//! - [`Document`]: a disbursement or journal with its line items, step flow,
//!   tracking ledger and attachments
//! - [`StepFlow`] / [`FlowStep`]: the ordered approvers, validated on
//!   construction so positions are always `1..=N`
//! - [`TrackingEntry`]: one write-once ledger row per step
//! - [`User`], [`Actor`], [`Account`], [`PrefixConfig`]: directory data the
//!   engine validates against
//!
//! # Examples
//!
//! ```rust
//! use countersign_core::models::{FlowStep, Role, StepFlow};
//!
//! let flow = StepFlow::new(vec![
//!     FlowStep { position: 1, role: Role::AccountingAssistant, assigned_user: None },
//!     FlowStep { position: 2, role: Role::Svp, assigned_user: Some(7) },
//! ])?;
//! assert_eq!(flow.len(), 2);
//! assert_eq!(flow.step(2).and_then(|s| s.assigned_user), Some(7));
//! # Ok::<(), countersign_core::ApprovalError>(())
//! ```

pub mod directory;
pub mod document;
pub mod filters;
pub mod requests;
pub mod status;
pub mod step;
pub mod summary;
pub mod tracking;

#[cfg(test)]
mod tests;

pub use directory::{Account, Actor, PrefixConfig, User};
pub use document::{Attachment, Document, LineItem};
pub use filters::DocumentFilter;
pub use requests::{DecisionRequest, NewDocument, NewLineItem};
pub use status::{Decision, DocumentKind, DocumentStatus, EntryType, Role};
pub use step::{FlowStep, StepFlow};
pub use summary::DocumentSummary;
pub use tracking::TrackingEntry;

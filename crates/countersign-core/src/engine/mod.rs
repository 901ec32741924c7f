//! High-level approval engine API.
//!
//! [`Engine`] is the entry point for application layers. It validates
//! requests, runs storage work on the blocking thread pool and publishes
//! events once a change has committed.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │     Params      │    │     Engine      │    │    Database     │
//! │ (plain request  │───▶│ (validation,    │───▶│ (one immediate  │
//! │     shapes)     │    │  orchestration) │    │  transaction)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                                 │
//!                                 ▼  after commit
//!                        ┌─────────────────┐
//!                        │  Event sinks    │
//!                        │ (audit, notify) │
//!                        └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: configuration and construction of an [`Engine`]
//! - [`decision`]: the per-decision checks run inside the storage transaction
//! - [`document_ops`]: create, decide, read and delete documents
//! - [`directory_ops`]: users, accounts and control-number prefixes
//! - [`retention`]: attachments and the purge of old rejected documents
//!
//! # Usage
//!
//! ```rust,no_run
//! use countersign_core::{EngineBuilder, params::Decide};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new()
//!     .with_database_path(Some("/tmp/countersign.db"))
//!     .build()
//!     .await?;
//!
//! let outcome = engine
//!     .decide(&Decide {
//!         document_id: 1,
//!         actor_id: 2,
//!         action: "approve".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{}", outcome.document.status);
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use tokio::task;

use crate::{
    attachments::AttachmentStore,
    control_number::ControlNumberGenerator,
    db::Database,
    error::{ApprovalError, Result},
    events::EventDispatcher,
    flow::StepTemplate,
    machine::Transition,
    models::Document,
};

pub mod builder;
pub mod decision;
pub mod directory_ops;
pub mod document_ops;
pub mod retention;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;

/// Main engine interface for routing documents through approval.
pub struct Engine {
    pub(crate) db_path: PathBuf,
    pub(crate) template: StepTemplate,
    pub(crate) control_numbers: ControlNumberGenerator,
    pub(crate) attachments: Arc<dyn AttachmentStore>,
    pub(crate) events: EventDispatcher,
}

/// A committed decision together with the document it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOutcome {
    pub document: Document,
    pub transition: Transition,
}

impl Engine {
    /// Path of the SQLite database this engine writes to.
    pub fn database_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Step template applied to new documents.
    pub fn step_template(&self) -> &StepTemplate {
        &self.template
    }

    /// Runs `op` against a fresh connection on the blocking thread pool.
    pub(crate) async fn with_database<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(|e| ApprovalError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}

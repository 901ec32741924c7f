//! Core library for the Countersign approval engine.
//!
//! Disbursement and journal documents are routed through an ordered chain
//! of approver roles. Every step's outcome is written once to a tracking
//! ledger, and the document's status is always what that ledger implies:
//! approved once every step approved, rejected as soon as one step rejects,
//! pending otherwise.
//!
//! # Layers
//!
//! - [`machine`], [`ledger`], [`policy`] and [`flow`]: the pure approval
//!   rules, free of storage
//! - [`control_number`]: `PREFIX-YY-RANDOM6` identifiers
//! - [`db`]: SQLite persistence with one immediate transaction per change
//! - [`engine`]: the async API that ties validation, storage and [`events`]
//!   together
//! - [`display`]: markdown formatting for terminal output
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use countersign_core::{
//!     params::{CreateAccount, CreateDocument, CreatePrefix, CreateUser, Decide, LineItemInput},
//!     EngineBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new()
//!     .with_database_path(Some("countersign.db"))
//!     .build()
//!     .await?;
//!
//! engine.create_prefix(&CreatePrefix { code: "DV".into(), description: None }).await?;
//! let cash = engine.create_account(&CreateAccount { code: "1000".into(), name: "Cash".into() }).await?;
//! let rent = engine.create_account(&CreateAccount { code: "6100".into(), name: "Rent".into() }).await?;
//! let clerk = engine.create_user(&CreateUser { name: "Ana".into(), role: "accounting_assistant".into() }).await?;
//!
//! let document = engine
//!     .create_document(&CreateDocument {
//!         kind: "disbursement".into(),
//!         title: "Office rent".into(),
//!         prefix: "DV".into(),
//!         created_by: clerk.id,
//!         line_items: vec![
//!             LineItemInput { account_id: rent.id, entry_type: "debit".into(), amount: "500".into(), ..Default::default() },
//!             LineItemInput { account_id: cash.id, entry_type: "credit".into(), amount: "500".into(), ..Default::default() },
//!         ],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let outcome = engine
//!     .decide(&Decide {
//!         document_id: document.id,
//!         actor_id: clerk.id,
//!         action: "approve".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod attachments;
pub mod control_number;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod events;
pub mod flow;
pub mod ledger;
pub mod machine;
pub mod models;
pub mod params;
pub mod policy;

// Re-export commonly used types
pub use attachments::{AttachmentStore, LocalAttachmentStore};
pub use db::Database;
pub use display::{CreateResult, DeleteResult, DocumentSummaries, OperationStatus};
pub use engine::{DecisionOutcome, Engine, EngineBuilder};
pub use error::{ApprovalError, Result};
pub use events::{AuditSink, EventDispatcher, LogSink, MemorySink, NotificationSink};
pub use flow::StepTemplate;
pub use machine::Transition;
pub use models::{
    Decision, Document, DocumentFilter, DocumentKind, DocumentStatus, DocumentSummary, Role,
    StepFlow, TrackingEntry,
};

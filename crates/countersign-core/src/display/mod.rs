//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! this module adds newtype wrappers for collections and operation results so
//! the same data can be framed differently in list, create and delete
//! contexts. Everything is emitted as markdown for the terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │    Wrappers     │    │   Formatted     │
//! │ (Document, ...) │───▶│ (collections,   │───▶│    Markdown     │
//! │                 │    │  results)       │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: `DocumentSummaries`, `Users`, `Accounts`, `Prefixes`
//! - [`results`]: `CreateResult`, `DeleteResult` and the decision outcome
//! - [`status`]: `OperationStatus` confirmation messages
//! - [`datetime`]: `LocalDateTime` timestamp formatting
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use countersign_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Prefix DV deactivated".to_string());
//! assert_eq!(status.to_string(), "Success: Prefix DV deactivated\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Accounts, DocumentSummaries, Prefixes, Users};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult};
pub use status::OperationStatus;

//! SQLite storage for documents, the tracking ledger and directory data.
//!
//! Every public operation runs inside a single transaction. Writers open an
//! `IMMEDIATE` transaction so the write lock is taken before anything is read;
//! concurrent writers wait on the busy timeout instead of racing.

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod attachment_queries;
pub mod directory_queries;
pub mod document_queries;
pub mod migrations;
pub mod utils;

/// How long a connection waits for another writer's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens a connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

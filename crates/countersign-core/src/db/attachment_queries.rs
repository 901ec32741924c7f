//! Attachment bookkeeping.

use jiff::Timestamp;
use log::warn;
use rusqlite::{params, Connection, Row, TransactionBehavior};

use super::utils::{get_id, get_timestamp};
use crate::{
    attachments::{attachment_path, AttachmentStore},
    error::{ApprovalError, DatabaseResultExt, Result},
    models::Attachment,
};

const SELECT_ATTACHMENTS_SQL: &str = "SELECT id, document_id, file_path, file_name, file_type, created_at FROM attachments WHERE document_id = ?1 ORDER BY id";
const INSERT_ATTACHMENT_SQL: &str = "INSERT INTO attachments (document_id, file_path, file_name, file_type, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const CHECK_DOCUMENT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?1)";
const NEXT_ATTACHMENT_ID_SQL: &str = "SELECT COALESCE(MAX(id), 0) + 1 FROM attachments";

fn attachment_from_row(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: get_id(row, 0)?,
        document_id: get_id(row, 1)?,
        file_path: row.get(2)?,
        file_name: row.get(3)?,
        file_type: row.get(4)?,
        created_at: get_timestamp(row, 5)?,
    })
}

pub(crate) fn select_attachments(conn: &Connection, document_id: u64) -> Result<Vec<Attachment>> {
    let mut stmt = conn
        .prepare(SELECT_ATTACHMENTS_SQL)
        .db_context("Failed to prepare query")?;
    let rows = stmt
        .query_map(params![document_id as i64], attachment_from_row)
        .db_context("Failed to query attachments")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to parse attachment row")
}

impl super::Database {
    /// Stores `contents` and records the attachment against a document.
    ///
    /// The file is written before the row is inserted. If the insert does not
    /// commit, the file is removed again.
    pub fn add_attachment(
        &mut self,
        document_id: u64,
        file_name: &str,
        file_type: &str,
        contents: &[u8],
        store: &dyn AttachmentStore,
    ) -> Result<Attachment> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ApprovalError::validation("file_name")
                .with_reason("File name must not be empty"));
        }

        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_DOCUMENT_EXISTS_SQL, params![document_id as i64], |row| row.get(0))
            .db_context("Failed to check document existence")?;
        if !exists {
            return Err(ApprovalError::DocumentNotFound { id: document_id });
        }

        let next_id: i64 = tx
            .query_row(NEXT_ATTACHMENT_ID_SQL, [], |row| row.get(0))
            .db_context("Failed to allocate attachment id")?;
        let file_path = attachment_path(document_id, next_id, file_name);
        let created_at = Timestamp::now();

        store.store(&file_path, contents)?;

        let inserted = tx
            .execute(
                INSERT_ATTACHMENT_SQL,
                params![
                    document_id as i64,
                    &file_path,
                    file_name,
                    file_type,
                    created_at.to_string()
                ],
            )
            .db_context("Failed to insert attachment")
            .and_then(|_| {
                let id = tx.last_insert_rowid() as u64;
                tx.commit().db_context("Failed to commit transaction")?;
                Ok(id)
            });

        match inserted {
            Ok(id) => Ok(Attachment {
                id,
                document_id,
                file_path,
                file_name: file_name.to_string(),
                file_type: file_type.to_string(),
                created_at,
            }),
            Err(e) => {
                if let Err(cleanup) = store.delete(&file_path) {
                    warn!("Failed to remove orphaned attachment {file_path}: {cleanup}");
                }
                Err(e)
            }
        }
    }
}

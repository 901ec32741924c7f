//! Document CRUD, the atomic decision commit and ordered deletion.

use std::collections::HashMap;

use jiff::Timestamp;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;

use super::{
    attachment_queries::select_attachments,
    directory_queries::{find_account, find_prefix, find_user},
    utils::{
        get_decimal, get_enum, get_id, get_optional_enum, get_optional_id,
        get_optional_timestamp, get_timestamp,
    },
};
use crate::{
    attachments::AttachmentStore,
    control_number::{current_year, resolve_prefix, ControlNumberGenerator},
    error::{ApprovalError, DatabaseResultExt, Result},
    flow::{verify_assignees, StepTemplate},
    machine::{self, Transition},
    models::{
        Decision, Document, DocumentFilter, DocumentKind, DocumentStatus, DocumentSummary, FlowStep,
        LineItem, NewDocument, Role, StepFlow, TrackingEntry,
    },
};

const INSERT_DOCUMENT_SQL: &str = "INSERT INTO documents (kind, control_number, prefix, title, description, status, current_step, version, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', 1, 0, ?6, ?7, ?7)";
const INSERT_STEP_SQL: &str =
    "INSERT INTO document_steps (document_id, position, role, user_id) VALUES (?1, ?2, ?3, ?4)";
const INSERT_LINE_ITEM_SQL: &str = "INSERT INTO line_items (document_id, account_id, entry_type, amount, description, order_number) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const INSERT_TRACKING_SQL: &str =
    "INSERT INTO tracking_entries (document_id, step_number, role) VALUES (?1, ?2, ?3)";
const CHECK_CONTROL_NUMBER_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM documents WHERE control_number = ?1)";

const LIST_SUMMARIES_SQL: &str = "SELECT documents.id, documents.kind, documents.control_number, documents.title, documents.status, documents.current_step, documents.created_at, (SELECT COUNT(*) FROM document_steps s WHERE s.document_id = documents.id), (SELECT s.role FROM document_steps s WHERE s.document_id = documents.id AND s.position = documents.current_step) FROM documents";
const LIST_DEBITS_SQL: &str = "SELECT l.document_id, l.amount FROM line_items l JOIN documents ON documents.id = l.document_id AND l.entry_type = 'debit'";

const SELECT_DOCUMENT_SQL: &str = "SELECT id, kind, control_number, title, description, status, current_step, version, created_by, created_at, updated_at FROM documents WHERE id = ?1";
const SELECT_STEPS_SQL: &str =
    "SELECT position, role, user_id FROM document_steps WHERE document_id = ?1 ORDER BY position";
const SELECT_LINE_ITEMS_SQL: &str = "SELECT id, document_id, account_id, entry_type, amount, description, order_number FROM line_items WHERE document_id = ?1 ORDER BY order_number";
const SELECT_TRACKING_SQL: &str = "SELECT id, document_id, step_number, role, handled_by, action, remarks, acted_at FROM tracking_entries WHERE document_id = ?1 ORDER BY step_number";

const UPDATE_DOCUMENT_STATE_SQL: &str = "UPDATE documents SET status = ?1, current_step = ?2, version = version + 1, updated_at = ?3 WHERE id = ?4 AND version = ?5";
const RECORD_DECISION_SQL: &str = "UPDATE tracking_entries SET handled_by = ?1, action = ?2, remarks = ?3, acted_at = ?4 WHERE document_id = ?5 AND step_number = ?6 AND action IS NULL";

const DELETE_ATTACHMENTS_SQL: &str = "DELETE FROM attachments WHERE document_id = ?1";
const DELETE_TRACKING_SQL: &str = "DELETE FROM tracking_entries WHERE document_id = ?1";
const DELETE_LINE_ITEMS_SQL: &str = "DELETE FROM line_items WHERE document_id = ?1";
const DELETE_STEPS_SQL: &str = "DELETE FROM document_steps WHERE document_id = ?1";
const DELETE_DOCUMENT_SQL: &str = "DELETE FROM documents WHERE id = ?1";

const SELECT_REJECTIONS_SQL: &str = "SELECT d.id, t.acted_at FROM documents d JOIN tracking_entries t ON t.document_id = d.id AND t.action = 'rejected' WHERE d.status = 'rejected' ORDER BY d.id";

/// Scalar columns of a document row; the children are loaded separately.
struct DocumentRow {
    id: u64,
    kind: DocumentKind,
    control_number: String,
    title: String,
    description: Option<String>,
    status: DocumentStatus,
    current_step: u32,
    version: u64,
    created_by: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: get_id(row, 0)?,
            kind: get_enum(row, 1)?,
            control_number: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            status: get_enum(row, 5)?,
            current_step: row.get(6)?,
            version: get_id(row, 7)?,
            created_by: get_id(row, 8)?,
            created_at: get_timestamp(row, 9)?,
            updated_at: get_timestamp(row, 10)?,
        })
    }

    fn into_document(self, step_flow: StepFlow) -> Document {
        Document {
            id: self.id,
            kind: self.kind,
            control_number: self.control_number,
            title: self.title,
            description: self.description,
            status: self.status,
            current_step: self.current_step,
            version: self.version,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            line_items: Vec::new(),
            step_flow,
            tracking: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<FlowStep> {
    Ok(FlowStep {
        position: row.get(0)?,
        role: get_enum(row, 1)?,
        assigned_user: get_optional_id(row, 2)?,
    })
}

fn line_item_from_row(row: &Row<'_>) -> rusqlite::Result<LineItem> {
    Ok(LineItem {
        id: get_id(row, 0)?,
        document_id: get_id(row, 1)?,
        account_id: get_id(row, 2)?,
        entry_type: get_enum(row, 3)?,
        amount: get_decimal(row, 4)?,
        description: row.get(5)?,
        order_number: row.get(6)?,
    })
}

fn tracking_from_row(row: &Row<'_>) -> rusqlite::Result<TrackingEntry> {
    Ok(TrackingEntry {
        id: get_id(row, 0)?,
        document_id: get_id(row, 1)?,
        step_number: row.get(2)?,
        role: get_enum(row, 3)?,
        handled_by: get_optional_id(row, 4)?,
        action: get_optional_enum::<Decision>(row, 5)?,
        remarks: row.get(6)?,
        acted_at: get_optional_timestamp(row, 7)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentSummary> {
    let status: DocumentStatus = get_enum(row, 4)?;
    let role: Option<Role> = get_optional_enum(row, 8)?;
    Ok(DocumentSummary {
        id: get_id(row, 0)?,
        kind: get_enum(row, 1)?,
        control_number: row.get(2)?,
        title: row.get(3)?,
        status,
        current_step: row.get(5)?,
        total_steps: row.get(7)?,
        awaiting_role: role.filter(|_| !status.is_terminal()),
        total_amount: Decimal::ZERO,
        created_at: get_timestamp(row, 6)?,
    })
}

fn query_children<T, F>(conn: &Connection, sql: &str, document_id: u64, map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql).db_context("Failed to prepare query")?;
    let rows = stmt
        .query_map(params![document_id as i64], map)
        .db_context("Failed to query document children")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to parse document child row")
}

/// Loads a document with its flow, lines, ledger and attachments.
///
/// Every loaded document is checked against its ledger; a mismatch is
/// reported as `ApprovalError::Inconsistent` rather than returned.
pub(crate) fn load_document(conn: &Connection, id: u64) -> Result<Option<Document>> {
    let found = conn
        .query_row(SELECT_DOCUMENT_SQL, params![id as i64], DocumentRow::from_row)
        .optional()
        .db_context("Failed to query document")?;
    let Some(row) = found else {
        return Ok(None);
    };

    let steps = query_children(conn, SELECT_STEPS_SQL, id, step_from_row)?;
    let step_flow = StepFlow::new(steps).map_err(|e| ApprovalError::Inconsistent {
        id,
        reason: format!("stored step flow is malformed: {e}"),
    })?;
    let mut document = row.into_document(step_flow);
    document.line_items = query_children(conn, SELECT_LINE_ITEMS_SQL, id, line_item_from_row)?;
    document.tracking = query_children(conn, SELECT_TRACKING_SQL, id, tracking_from_row)?;
    document.attachments = select_attachments(conn, id)?;

    machine::check_consistency(&document)?;
    Ok(Some(document))
}

fn control_number_exists(conn: &Connection, candidate: &str) -> Result<bool> {
    conn.query_row(CHECK_CONTROL_NUMBER_SQL, params![candidate], |row| row.get(0))
        .db_context("Failed to check control number")
}

impl super::Database {
    /// Creates a document with its lines, step flow and open ledger.
    ///
    /// References are checked, the flow is materialized from `template` and
    /// the control number is generated inside one immediate transaction, so
    /// the collision check and the insert cannot interleave with another
    /// writer.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - unknown creator, account or assignee,
    ///   an assignee without the step's role, or an unknown/inactive prefix
    /// * `ApprovalError::ControlNumberExhausted` - no free number was found
    pub fn create_document(
        &mut self,
        request: &NewDocument,
        template: &StepTemplate,
        generator: &ControlNumberGenerator,
    ) -> Result<Document> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        if find_user(&tx, request.created_by)?.is_none() {
            return Err(ApprovalError::validation("created_by")
                .with_reason(format!("User {} does not exist", request.created_by)));
        }
        let prefix = resolve_prefix(&request.prefix, find_prefix(&tx, &request.prefix)?)?;
        for item in &request.line_items {
            if find_account(&tx, item.account_id)?.is_none() {
                return Err(ApprovalError::validation("line_items").with_reason(format!(
                    "Account {} does not exist (line {})",
                    item.account_id, item.order_number
                )));
            }
        }

        let flow = template.materialize(&request.assignments)?;
        verify_assignees(&flow, |user_id| find_user(&tx, user_id))?;

        let control_number = generator.generate(
            &prefix,
            current_year(),
            &mut rand::thread_rng(),
            |candidate| control_number_exists(&tx, candidate),
        )?;

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_DOCUMENT_SQL,
            params![
                request.kind.as_str(),
                &control_number,
                &prefix.code,
                &request.title,
                request.description.as_deref(),
                request.created_by as i64,
                &now
            ],
        )
        .db_context("Failed to insert document")?;
        let id = tx.last_insert_rowid() as u64;

        for step in &flow {
            tx.execute(
                INSERT_STEP_SQL,
                params![
                    id as i64,
                    step.position,
                    step.role.as_str(),
                    step.assigned_user.map(|u| u as i64)
                ],
            )
            .db_context("Failed to insert step")?;
            tx.execute(
                INSERT_TRACKING_SQL,
                params![id as i64, step.position, step.role.as_str()],
            )
            .db_context("Failed to insert tracking entry")?;
        }

        for item in &request.line_items {
            tx.execute(
                INSERT_LINE_ITEM_SQL,
                params![
                    id as i64,
                    item.account_id as i64,
                    item.entry_type.as_str(),
                    item.amount.to_string(),
                    item.description.as_deref(),
                    item.order_number
                ],
            )
            .db_context("Failed to insert line item")?;
        }

        let document = load_document(&tx, id)?.ok_or(ApprovalError::DocumentNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        info!(
            "Created {} {} with {} approval steps",
            document.kind.as_str(),
            document.control_number,
            document.step_flow.len()
        );
        Ok(document)
    }

    /// Retrieves a document with all its child collections.
    pub fn get_document(&self, id: u64) -> Result<Option<Document>> {
        load_document(&self.connection, id)
    }

    /// Lists document summaries matching `filter`, newest first.
    ///
    /// Summaries are built from the stored status and step pointer without
    /// loading each document; use [`get_document`](Self::get_document) for
    /// the ledger-checked view.
    pub fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentSummary>> {
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("documents.status = ?");
            params_vec.push(Box::new(status.as_str()));
        }
        if let Some(kind) = filter.kind {
            conditions.push("documents.kind = ?");
            params_vec.push(Box::new(kind.as_str()));
        }
        if let Some(role) = filter.awaiting_role {
            conditions.push(
                "documents.status = 'pending' AND EXISTS (SELECT 1 FROM document_steps s WHERE s.document_id = documents.id AND s.position = documents.current_step AND s.role = ?)",
            );
            params_vec.push(Box::new(role.as_str()));
        }
        if let Some(ref title) = filter.title_contains {
            conditions.push("documents.title LIKE ?");
            params_vec.push(Box::new(format!("%{title}%")));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let mut stmt = self
            .connection
            .prepare(&format!("{LIST_SUMMARIES_SQL}{where_clause} ORDER BY documents.id DESC"))
            .db_context("Failed to prepare query")?;
        let mut summaries = stmt
            .query_map(&params_refs[..], summary_from_row)
            .db_context("Failed to query documents")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to parse document row")?;

        let mut stmt = self
            .connection
            .prepare(&format!("{LIST_DEBITS_SQL}{where_clause}"))
            .db_context("Failed to prepare query")?;
        let debits = stmt
            .query_map(&params_refs[..], |row| Ok((get_id(row, 0)?, get_decimal(row, 1)?)))
            .db_context("Failed to query line items")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to parse line item row")?;

        let mut totals: HashMap<u64, Decimal> = HashMap::new();
        for (document_id, amount) in debits {
            *totals.entry(document_id).or_default() += amount;
        }
        for summary in &mut summaries {
            summary.total_amount = totals.get(&summary.id).copied().unwrap_or_default();
        }

        debug!("Listed {} documents", summaries.len());
        Ok(summaries)
    }

    /// Loads, mutates and persists a document in one immediate transaction.
    ///
    /// `apply` receives the freshly loaded document and returns the
    /// transition it made. The document row is written only if its version
    /// is unchanged, and the decided tracking entry only while it is still
    /// open; either guard failing aborts the transaction. An error from
    /// `apply` leaves storage untouched.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::DocumentNotFound` - no document with `id`
    /// * `ApprovalError::Conflict` - the version moved underneath us
    /// * `ApprovalError::AlreadyDecided` - the entry was decided concurrently
    /// * whatever `apply` returns
    pub fn commit_decision<F>(&mut self, id: u64, apply: F) -> Result<(Document, Transition)>
    where
        F: FnOnce(&mut Document) -> Result<Transition>,
    {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let mut document = load_document(&tx, id)?.ok_or(ApprovalError::DocumentNotFound { id })?;
        let expected = document.version;
        let transition = apply(&mut document)?;

        let updated = tx
            .execute(
                UPDATE_DOCUMENT_STATE_SQL,
                params![
                    document.status.as_str(),
                    document.current_step,
                    document.updated_at.to_string(),
                    id as i64,
                    expected as i64
                ],
            )
            .db_context("Failed to update document state")?;
        if updated == 0 {
            return Err(ApprovalError::Conflict { id, expected });
        }

        let recorded = tx
            .execute(
                RECORD_DECISION_SQL,
                params![
                    transition.actor_id as i64,
                    transition.decision.as_str(),
                    transition.remarks.as_deref(),
                    transition.at.to_string(),
                    id as i64,
                    transition.step_number
                ],
            )
            .db_context("Failed to record decision")?;
        if recorded == 0 {
            return Err(ApprovalError::AlreadyDecided {
                id,
                step: transition.step_number,
            });
        }

        tx.commit().db_context("Failed to commit transaction")?;
        document.version = expected + 1;

        info!(
            "Document {} step {} {} by user {} ({} -> {})",
            document.control_number,
            transition.step_number,
            transition.decision.as_str(),
            transition.actor_id,
            transition.from.as_str(),
            transition.to.as_str()
        );
        Ok((document, transition))
    }

    /// Deletes a document and everything it owns.
    ///
    /// Attachment rows, tracking entries, line items, the step flow and the
    /// document row are deleted in one transaction. Attachment files are
    /// removed only after it commits; a file that cannot be removed is
    /// logged and left behind.
    pub fn delete_document(&mut self, id: u64, store: &dyn AttachmentStore) -> Result<Document> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let document = load_document(&tx, id)?.ok_or(ApprovalError::DocumentNotFound { id })?;

        for sql in [
            DELETE_ATTACHMENTS_SQL,
            DELETE_TRACKING_SQL,
            DELETE_LINE_ITEMS_SQL,
            DELETE_STEPS_SQL,
            DELETE_DOCUMENT_SQL,
        ] {
            tx.execute(sql, params![id as i64])
                .db_context("Failed to delete document data")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        for attachment in &document.attachments {
            if let Err(e) = store.delete(&attachment.file_path) {
                warn!(
                    "Failed to remove attachment {} of deleted document {}: {e}",
                    attachment.file_path, document.control_number
                );
            }
        }
        info!("Deleted document {}", document.control_number);
        Ok(document)
    }

    /// IDs of rejected documents whose rejection was recorded before `cutoff`.
    pub fn rejected_before(&self, cutoff: Timestamp) -> Result<Vec<u64>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_REJECTIONS_SQL)
            .db_context("Failed to prepare query")?;
        let rows = stmt
            .query_map([], |row| Ok((get_id(row, 0)?, get_optional_timestamp(row, 1)?)))
            .db_context("Failed to query rejected documents")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to parse rejected document row")?;

        let ids: Vec<u64> = rows
            .into_iter()
            .filter_map(|(id, rejected_at)| match rejected_at {
                Some(at) if at < cutoff => Some(id),
                _ => None,
            })
            .collect();
        debug!("{} rejected documents predate {cutoff}", ids.len());
        Ok(ids)
    }
}

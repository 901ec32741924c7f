//! Attachments and the retention purge of rejected documents.

use jiff::{SignedDuration, Timestamp};
use log::info;

use super::Engine;
use crate::{
    error::{ApprovalError, Result},
    models::{Attachment, Document},
    params::{AddAttachment, PurgeRejected},
};

impl Engine {
    /// Stores a file and attaches it to a document.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::DocumentNotFound` - no such document
    /// * `ApprovalError::Validation` - empty file name
    /// * `ApprovalError::FileSystem` - the store could not write the file
    pub async fn add_attachment(&self, params: &AddAttachment) -> Result<Attachment> {
        let params = params.clone();
        let store = self.attachments.clone();
        self.with_database(move |db| {
            db.add_attachment(
                params.document_id,
                &params.file_name,
                &params.file_type,
                &params.contents,
                store.as_ref(),
            )
        })
        .await
    }

    /// Deletes rejected documents rejected more than `older_than_days` ago.
    ///
    /// Returns the deleted documents. Pending and approved documents are
    /// never touched.
    pub async fn purge_rejected(&self, params: &PurgeRejected) -> Result<Vec<Document>> {
        let age = SignedDuration::from_hours(24 * i64::from(params.older_than_days));
        let cutoff = Timestamp::now()
            .checked_sub(age)
            .map_err(|e| ApprovalError::validation("older_than_days").with_reason(e.to_string()))?;
        self.purge_rejected_before(cutoff).await
    }

    /// Deletes rejected documents whose rejection was recorded before `cutoff`.
    pub async fn purge_rejected_before(&self, cutoff: Timestamp) -> Result<Vec<Document>> {
        let store = self.attachments.clone();
        let purged = self
            .with_database(move |db| {
                let ids = db.rejected_before(cutoff)?;
                ids.into_iter()
                    .map(|id| db.delete_document(id, store.as_ref()))
                    .collect::<Result<Vec<_>>>()
            })
            .await?;

        info!("Purged {} rejected documents older than {cutoff}", purged.len());
        Ok(purged)
    }
}

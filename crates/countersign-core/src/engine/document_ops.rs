//! Document operations for the Engine.

use jiff::Timestamp;

use super::{decision::apply_decision, DecisionOutcome, Engine};
use crate::{
    display::DocumentSummaries,
    error::{ApprovalError, Result},
    events::{creation_events, decision_events},
    models::{Actor, DecisionRequest, Document, DocumentFilter, NewDocument},
    params::{CreateDocument, Decide, Id, ListDocuments},
};

impl Engine {
    /// Creates a document and routes it to the first approver.
    ///
    /// Line items, the approver assignments and the prefix are validated, a
    /// control number is generated and the document, its lines, step flow
    /// and open ledger are persisted in one transaction. A
    /// `document_created` fact and a notification to the first approver are
    /// published after the commit.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - malformed request or unknown references
    /// * `ApprovalError::ControlNumberExhausted` - no free control number
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use countersign_core::{params::{CreateDocument, LineItemInput}, EngineBuilder};
    /// # async {
    /// let engine = EngineBuilder::new().build().await?;
    /// let document = engine
    ///     .create_document(&CreateDocument {
    ///         kind: "disbursement".to_string(),
    ///         title: "Office rent".to_string(),
    ///         prefix: "DV".to_string(),
    ///         created_by: 1,
    ///         line_items: vec![
    ///             LineItemInput { account_id: 1, entry_type: "debit".into(), amount: "500".into(), ..Default::default() },
    ///             LineItemInput { account_id: 2, entry_type: "credit".into(), amount: "500".into(), ..Default::default() },
    ///         ],
    ///         ..Default::default()
    ///     })
    ///     .await?;
    /// assert_eq!(document.current_step, 1);
    /// # Result::<(), countersign_core::ApprovalError>::Ok(())
    /// # };
    /// ```
    pub async fn create_document(&self, params: &CreateDocument) -> Result<Document> {
        let request = NewDocument::try_from(params.clone())?;
        let template = self.template.clone();
        let generator = self.control_numbers;

        let document = self
            .with_database(move |db| db.create_document(&request, &template, &generator))
            .await?;

        self.events.publish(&creation_events(&document));
        Ok(document)
    }

    /// Records an approve or reject decision on a document's current step.
    ///
    /// Load, checks, the state machine and the write all happen inside one
    /// immediate transaction, so of two simultaneous decisions on the same
    /// step exactly one commits. Events are published after the commit and
    /// their failures never undo it.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - the action is not approve/reject
    /// * `ApprovalError::DocumentNotFound` - no such document
    /// * `ApprovalError::AlreadyFinalized` - the document is approved or rejected
    /// * `ApprovalError::Forbidden` - unknown actor, wrong role or assignee,
    ///   or not this step's turn
    /// * `ApprovalError::AlreadyDecided` - the step was decided already
    /// * `ApprovalError::Database` / `ApprovalError::Conflict` - nothing was
    ///   written; the call may be retried
    pub async fn decide(&self, params: &Decide) -> Result<DecisionOutcome> {
        let request = DecisionRequest::try_from(params.clone())?;

        let (document, transition) = self
            .with_database(move |db| {
                let actor = db.get_user(request.actor_id)?.as_ref().map(Actor::from);
                db.commit_decision(request.document_id, |document| {
                    apply_decision(document, actor.as_ref(), &request, Timestamp::now())
                })
            })
            .await?;

        self.events.publish(&decision_events(&document, &transition));
        Ok(DecisionOutcome {
            document,
            transition,
        })
    }

    /// Retrieves a document with its lines, flow, ledger and attachments.
    pub async fn get_document(&self, params: &Id) -> Result<Option<Document>> {
        let id = params.id;
        self.with_database(move |db| db.get_document(id)).await
    }

    /// Retrieves a document, failing when it does not exist.
    pub async fn require_document(&self, params: &Id) -> Result<Document> {
        self.get_document(params)
            .await?
            .ok_or(ApprovalError::DocumentNotFound { id: params.id })
    }

    /// Lists documents matching the filters as summaries, newest first.
    ///
    /// `awaiting_role` selects the inbox of an approver role: pending
    /// documents whose current step belongs to that role.
    pub async fn list_documents(&self, params: &ListDocuments) -> Result<DocumentSummaries> {
        let filter = DocumentFilter::try_from(params)?;
        let summaries = self
            .with_database(move |db| db.list_documents(&filter))
            .await?;
        Ok(DocumentSummaries(summaries))
    }

    /// Deletes a document together with its attachments, ledger, lines and
    /// flow.
    pub async fn delete_document(&self, params: &Id) -> Result<Document> {
        let id = params.id;
        let store = self.attachments.clone();
        self.with_database(move |db| db.delete_document(id, store.as_ref()))
            .await
    }
}

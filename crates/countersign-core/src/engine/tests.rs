//! Tests for the engine module.

use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::{
    events::{EventType, MemorySink, Recipient},
    models::{Account, Decision, DocumentStatus, Role, User},
    params::{
        AddAttachment, ApproverAssignment, CreateAccount, CreateDocument, CreatePrefix,
        CreateUser, Decide, Id, LineItemInput, ListDocuments, PurgeRejected,
    },
};

struct Fixture {
    temp_dir: TempDir,
    engine: Engine,
    sink: Arc<MemorySink>,
    /// One user per role, in default flow order
    approvers: Vec<User>,
    expense: Account,
    cash: Account,
}

impl Fixture {
    fn approver(&self, role: Role) -> &User {
        self.approvers
            .iter()
            .find(|u| u.role == role)
            .expect("fixture has every role")
    }

    fn document_params(&self, amount: &str) -> CreateDocument {
        CreateDocument {
            kind: "disbursement".to_string(),
            title: "Courier services".to_string(),
            description: None,
            prefix: "DV".to_string(),
            created_by: self.approvers[0].id,
            line_items: vec![
                LineItemInput {
                    account_id: self.expense.id,
                    entry_type: "debit".to_string(),
                    amount: amount.to_string(),
                    ..Default::default()
                },
                LineItemInput {
                    account_id: self.cash.id,
                    entry_type: "credit".to_string(),
                    amount: amount.to_string(),
                    ..Default::default()
                },
            ],
            approvers: vec![],
        }
    }

    async fn decide(&self, document_id: u64, role: Role, action: &str) -> Result<DecisionOutcome> {
        self.engine
            .decide(&Decide {
                document_id,
                actor_id: self.approver(role).id,
                action: action.to_string(),
                ..Default::default()
            })
            .await
    }
}

/// Helper function to create an engine with a seeded directory
async fn create_fixture() -> Fixture {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sink = Arc::new(MemorySink::new());
    let engine = EngineBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_audit_sink(sink.clone())
        .with_notification_sink(sink.clone())
        .build()
        .await
        .expect("Failed to create engine");

    engine
        .create_prefix(&CreatePrefix {
            code: "dv".to_string(),
            description: Some("Disbursement voucher".to_string()),
        })
        .await
        .expect("Failed to create prefix");
    let expense = engine
        .create_account(&CreateAccount {
            code: "6100".to_string(),
            name: "Delivery expense".to_string(),
        })
        .await
        .expect("Failed to create account");
    let cash = engine
        .create_account(&CreateAccount {
            code: "1000".to_string(),
            name: "Cash in bank".to_string(),
        })
        .await
        .expect("Failed to create account");

    let mut approvers = Vec::new();
    for (name, role) in [
        ("Ana", "accounting_assistant"),
        ("Ben", "accounting_head"),
        ("Cora", "auditor"),
        ("Dan", "svp"),
    ] {
        approvers.push(
            engine
                .create_user(&CreateUser {
                    name: name.to_string(),
                    role: role.to_string(),
                })
                .await
                .expect("Failed to create user"),
        );
    }

    Fixture {
        temp_dir,
        engine,
        sink,
        approvers,
        expense,
        cash,
    }
}

#[tokio::test]
async fn test_create_document_opens_ledger() {
    let fx = create_fixture().await;
    let document = fx
        .engine
        .create_document(&fx.document_params("250"))
        .await
        .expect("Failed to create document");

    assert_eq!(document.status, DocumentStatus::Pending);
    assert_eq!(document.current_step, 1);
    assert_eq!(document.version, 0);
    assert_eq!(document.step_flow.len(), 4);
    assert_eq!(document.tracking.len(), 4);
    assert!(document.tracking.iter().all(|e| !e.is_decided()));
    assert_eq!(document.line_items.len(), 2);
    assert_eq!(document.line_items[0].amount.to_string(), "250.00");

    let year = crate::control_number::current_year().rem_euclid(100);
    assert!(document
        .control_number
        .starts_with(&format!("DV-{year:02}-")));

    let facts = fx.sink.audit_facts();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].event_type, EventType::DocumentCreated);
    let notifications = fx.sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].recipient,
        Recipient::Role(Role::AccountingAssistant)
    );
}

#[tokio::test]
async fn test_create_document_validates_references() {
    let fx = create_fixture().await;

    let mut unknown_prefix = fx.document_params("10");
    unknown_prefix.prefix = "ZZ".to_string();
    let err = fx.engine.create_document(&unknown_prefix).await.unwrap_err();
    assert!(err.to_string().contains("Prefix 'ZZ' is not configured"));

    let mut unknown_account = fx.document_params("10");
    unknown_account.line_items[0].account_id = 999;
    let err = fx.engine.create_document(&unknown_account).await.unwrap_err();
    assert!(err.to_string().contains("Account 999 does not exist"));

    let mut unknown_creator = fx.document_params("10");
    unknown_creator.created_by = 999;
    assert!(matches!(
        fx.engine.create_document(&unknown_creator).await,
        Err(ApprovalError::Validation { .. })
    ));

    let mut wrong_assignee = fx.document_params("10");
    wrong_assignee.approvers = vec![ApproverAssignment {
        position: 3,
        user_id: fx.approver(Role::Svp).id,
    }];
    let err = fx.engine.create_document(&wrong_assignee).await.unwrap_err();
    assert!(err.to_string().contains("step 3 requires Auditor"));

    let listed = fx
        .engine
        .list_documents(&ListDocuments::default())
        .await
        .unwrap();
    assert!(listed.is_empty(), "failed creations must not persist");
}

#[tokio::test]
async fn test_inactive_prefix_refuses_new_documents() {
    let fx = create_fixture().await;
    let prefix = fx.engine.set_prefix_active("dv", false).await.unwrap();
    assert!(!prefix.active);

    let err = fx
        .engine
        .create_document(&fx.document_params("10"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("inactive"));
}

#[tokio::test]
async fn test_decide_walks_the_chain() {
    let fx = create_fixture().await;
    let document = fx
        .engine
        .create_document(&fx.document_params("99.99"))
        .await
        .unwrap();

    for (index, role) in Role::ALL.into_iter().enumerate() {
        let outcome = fx.decide(document.id, role, "approve").await.expect("approve");
        assert_eq!(outcome.transition.step_number, index as u32 + 1);
        assert_eq!(outcome.document.version, index as u64 + 1);
    }

    let document = fx
        .engine
        .require_document(&Id { id: document.id })
        .await
        .unwrap();
    assert_eq!(document.status, DocumentStatus::Approved);
    assert_eq!(document.current_step, 5);
    assert!(document
        .tracking
        .iter()
        .zip(&fx.approvers)
        .all(|(entry, user)| entry.action == Some(Decision::Approved)
            && entry.handled_by == Some(user.id)
            && entry.acted_at.is_some()));

    // created + 4 decisions + 3 step_advanced
    assert_eq!(fx.sink.audit_facts().len(), 8);
    let last = fx.sink.notifications().pop().expect("notification");
    assert_eq!(last.recipient, Recipient::User(fx.approvers[0].id));
}

#[tokio::test]
async fn test_decide_refusals_leave_document_untouched() {
    let fx = create_fixture().await;
    let document = fx
        .engine
        .create_document(&fx.document_params("10"))
        .await
        .unwrap();

    let wrong_role = fx.decide(document.id, Role::Auditor, "approve").await;
    assert!(matches!(wrong_role, Err(ApprovalError::Forbidden { .. })));

    let unknown_actor = fx
        .engine
        .decide(&Decide {
            document_id: document.id,
            actor_id: 4242,
            action: "approve".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        unknown_actor,
        Err(ApprovalError::Forbidden { ref reason }) if reason.contains("4242")
    ));

    let bad_action = fx.decide(document.id, Role::AccountingAssistant, "escalate").await;
    assert!(matches!(bad_action, Err(ApprovalError::Validation { .. })));

    let missing = fx.decide(9999, Role::AccountingAssistant, "approve").await;
    assert!(matches!(
        missing,
        Err(ApprovalError::DocumentNotFound { id: 9999 })
    ));

    let reloaded = fx
        .engine
        .require_document(&Id { id: document.id })
        .await
        .unwrap();
    assert_eq!(reloaded, document);
}

#[tokio::test]
async fn test_expected_step_guards_stale_clients() {
    let fx = create_fixture().await;
    let document = fx
        .engine
        .create_document(&fx.document_params("10"))
        .await
        .unwrap();
    fx.decide(document.id, Role::AccountingAssistant, "approve")
        .await
        .unwrap();

    let stale = fx
        .engine
        .decide(&Decide {
            document_id: document.id,
            actor_id: fx.approver(Role::AccountingAssistant).id,
            action: "reject".to_string(),
            expected_step: Some(1),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        stale,
        Err(ApprovalError::AlreadyDecided { step: 1, .. })
    ));

    let ahead = fx
        .engine
        .decide(&Decide {
            document_id: document.id,
            actor_id: fx.approver(Role::Auditor).id,
            action: "approve".to_string(),
            expected_step: Some(3),
            ..Default::default()
        })
        .await;
    assert!(matches!(ahead, Err(ApprovalError::Forbidden { .. })));
}

#[tokio::test]
async fn test_assigned_step_requires_the_assignee() {
    let fx = create_fixture().await;
    let second_head = fx
        .engine
        .create_user(&CreateUser {
            name: "Eve".to_string(),
            role: "head".to_string(),
        })
        .await
        .unwrap();

    let mut params = fx.document_params("10");
    params.approvers = vec![ApproverAssignment {
        position: 2,
        user_id: second_head.id,
    }];
    let document = fx.engine.create_document(&params).await.unwrap();
    assert_eq!(
        document.step_flow.step(2).and_then(|s| s.assigned_user),
        Some(second_head.id)
    );

    fx.decide(document.id, Role::AccountingAssistant, "approve")
        .await
        .unwrap();
    let notification = fx.sink.notifications().pop().unwrap();
    assert_eq!(notification.recipient, Recipient::User(second_head.id));

    let other_head = fx.decide(document.id, Role::AccountingHead, "approve").await;
    assert!(matches!(other_head, Err(ApprovalError::Forbidden { .. })));

    let outcome = fx
        .engine
        .decide(&Decide {
            document_id: document.id,
            actor_id: second_head.id,
            action: "approve".to_string(),
            remarks: Some("Within budget".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(outcome.document.current_step, 3);
    assert_eq!(
        outcome.document.tracking[1].remarks.as_deref(),
        Some("Within budget")
    );
}

#[tokio::test]
async fn test_list_documents_by_awaiting_role() {
    let fx = create_fixture().await;
    let first = fx
        .engine
        .create_document(&fx.document_params("10"))
        .await
        .unwrap();
    let second = fx
        .engine
        .create_document(&fx.document_params("20"))
        .await
        .unwrap();
    fx.decide(second.id, Role::AccountingAssistant, "approve")
        .await
        .unwrap();

    let assistant_inbox = fx
        .engine
        .list_documents(&ListDocuments {
            awaiting_role: Some("accounting_assistant".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(assistant_inbox.len(), 1);
    assert_eq!(assistant_inbox[0].id, first.id);

    let head_inbox = fx
        .engine
        .list_documents(&ListDocuments {
            awaiting_role: Some("accounting_head".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(head_inbox.len(), 1);
    assert_eq!(head_inbox[0].id, second.id);
    assert_eq!(head_inbox[0].awaiting_role, Some(Role::AccountingHead));

    let all = fx
        .engine
        .list_documents(&ListDocuments::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id, "newest first");
}

#[tokio::test]
async fn test_attachments_and_delete() {
    let fx = create_fixture().await;
    let document = fx
        .engine
        .create_document(&fx.document_params("10"))
        .await
        .unwrap();

    let attachment = fx
        .engine
        .add_attachment(&AddAttachment {
            document_id: document.id,
            file_name: "waybill.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            contents: b"%PDF".to_vec(),
        })
        .await
        .unwrap();
    let stored = fx.temp_dir.path().join("attachments").join(&attachment.file_path);
    assert!(stored.exists());

    let missing = fx
        .engine
        .add_attachment(&AddAttachment {
            document_id: 9999,
            file_name: "x.txt".to_string(),
            file_type: "text/plain".to_string(),
            contents: vec![],
        })
        .await;
    assert!(matches!(
        missing,
        Err(ApprovalError::DocumentNotFound { id: 9999 })
    ));

    let deleted = fx
        .engine
        .delete_document(&Id { id: document.id })
        .await
        .unwrap();
    assert_eq!(deleted.attachments.len(), 1);
    assert!(!stored.exists());
    assert!(fx
        .engine
        .get_document(&Id { id: document.id })
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_purge_only_removes_rejected() {
    let fx = create_fixture().await;
    let rejected = fx
        .engine
        .create_document(&fx.document_params("10"))
        .await
        .unwrap();
    let pending = fx
        .engine
        .create_document(&fx.document_params("20"))
        .await
        .unwrap();
    fx.decide(rejected.id, Role::AccountingAssistant, "reject")
        .await
        .unwrap();

    let kept = fx
        .engine
        .purge_rejected(&PurgeRejected { older_than_days: 30 })
        .await
        .unwrap();
    assert!(kept.is_empty(), "recent rejections are retained");

    let purged = fx
        .engine
        .purge_rejected(&PurgeRejected { older_than_days: 0 })
        .await
        .unwrap();
    assert_eq!(purged.len(), 1);
    assert_eq!(purged[0].id, rejected.id);

    assert!(fx
        .engine
        .get_document(&Id { id: pending.id })
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_builder_rejects_zero_attempts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = EngineBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_control_number_attempts(0)
        .build()
        .await;
    assert!(matches!(result, Err(ApprovalError::Configuration { .. })));
}

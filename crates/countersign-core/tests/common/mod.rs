#![allow(dead_code)]

use std::sync::Arc;

use countersign_core::{
    models::{Account, User},
    params::{CreateAccount, CreateDocument, CreatePrefix, CreateUser, LineItemInput},
    Engine, EngineBuilder, MemorySink, Role, StepTemplate,
};
use tempfile::TempDir;

/// A seeded engine: prefix `DV`, two accounts and one user per role.
pub struct TestEngine {
    pub temp_dir: TempDir,
    pub engine: Engine,
    pub sink: Arc<MemorySink>,
    pub users: Vec<User>,
    pub debit_account: Account,
    pub credit_account: Account,
}

impl TestEngine {
    /// The seeded user holding `role`.
    pub fn user(&self, role: Role) -> &User {
        self.users
            .iter()
            .find(|u| u.role == role)
            .expect("every role is seeded")
    }

    /// A balanced two-line disbursement for `amount`, created by the assistant.
    pub fn voucher(&self, title: &str, amount: &str) -> CreateDocument {
        CreateDocument {
            kind: "disbursement".to_string(),
            title: title.to_string(),
            prefix: "DV".to_string(),
            created_by: self.user(Role::AccountingAssistant).id,
            line_items: vec![
                LineItemInput {
                    account_id: self.debit_account.id,
                    entry_type: "debit".to_string(),
                    amount: amount.to_string(),
                    ..Default::default()
                },
                LineItemInput {
                    account_id: self.credit_account.id,
                    entry_type: "credit".to_string(),
                    amount: amount.to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }
}

/// Helper function to create a seeded test engine
pub async fn create_test_engine() -> TestEngine {
    create_test_engine_with_template(StepTemplate::default()).await
}

/// Helper function to create a seeded test engine routing through `template`
pub async fn create_test_engine_with_template(template: StepTemplate) -> TestEngine {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let sink = Arc::new(MemorySink::new());
    let engine = EngineBuilder::new()
        .with_database_path(Some(&db_path))
        .with_step_template(template)
        .with_audit_sink(sink.clone())
        .with_notification_sink(sink.clone())
        .build()
        .await
        .expect("Failed to create engine");

    engine
        .create_prefix(&CreatePrefix {
            code: "DV".to_string(),
            description: None,
        })
        .await
        .expect("Failed to create prefix");
    let debit_account = engine
        .create_account(&CreateAccount {
            code: "5100".to_string(),
            name: "Professional fees".to_string(),
        })
        .await
        .expect("Failed to create account");
    let credit_account = engine
        .create_account(&CreateAccount {
            code: "1010".to_string(),
            name: "Cash on hand".to_string(),
        })
        .await
        .expect("Failed to create account");

    let mut users = Vec::new();
    for role in Role::ALL {
        let user = engine
            .create_user(&CreateUser {
                name: format!("{role} user"),
                role: role.as_str().to_string(),
            })
            .await
            .expect("Failed to create user");
        users.push(user);
    }

    TestEngine {
        temp_dir,
        engine,
        sink,
        users,
        debit_account,
        credit_account,
    }
}

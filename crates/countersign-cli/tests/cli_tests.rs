use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a Command with --no-color against a test database
fn cs_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cs").expect("Failed to find cs binary");
    cmd.arg("--no-color")
        .arg("--database-file")
        .arg(db_path);
    cmd
}

/// Seeds prefix DV, accounts 1 (expense) and 2 (cash) and users 1 to 4, one
/// per role in approval order.
fn seed(db_path: &Path) {
    cs_cmd(db_path)
        .args(["prefix", "create", "dv", "--description", "Disbursement voucher"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configured prefix DV"));
    for (code, name) in [("6100", "Courier expense"), ("1000", "Cash in bank")] {
        cs_cmd(db_path)
            .args(["account", "create", code, name])
            .assert()
            .success();
    }
    for (name, role) in [
        ("Ana", "accounting-assistant"),
        ("Ben", "accounting-head"),
        ("Cora", "auditor"),
        ("Dan", "svp"),
    ] {
        cs_cmd(db_path)
            .args(["user", "create", name, "--role", role])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created user with ID"));
    }
}

fn create_voucher(db_path: &Path, title: &str) {
    cs_cmd(db_path)
        .args([
            "doc", "create", "disbursement", title, "--prefix", "DV", "--as", "1", "--line",
            "1:debit:250:Same-day delivery", "--line", "2:credit:250",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created disbursement DV-"))
        .stdout(predicate::str::contains("- Awaiting: step 1 of 4 (Accounting Assistant)"));
}

#[test]
fn test_cli_default_lists_pending_documents() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");

    cs_cmd(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No documents found."));
}

#[test]
fn test_cli_directory_listing() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");
    seed(&db_path);

    cs_cmd(&db_path)
        .args(["user", "list", "--role", "auditor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cora"))
        .stdout(predicate::str::contains("Ana").not());
    cs_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cash in bank"));
    cs_cmd(&db_path)
        .args(["prefix", "deactivate", "DV"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prefix DV deactivated"));
    cs_cmd(&db_path)
        .args(["prefix", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(inactive)"));
}

#[test]
fn test_cli_full_approval_chain() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");
    seed(&db_path);
    create_voucher(&db_path, "Courier services");

    for user in ["1", "2", "3"] {
        cs_cmd(&db_path)
            .args(["doc", "approve", "1", "--as", user])
            .assert()
            .success();
    }
    cs_cmd(&db_path)
        .args(["doc", "approve", "1", "--as", "4", "--remarks", "Release payment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Approved step 4 of DV-"))
        .stdout(predicate::str::contains("✓ Approved"));

    cs_cmd(&db_path)
        .args(["doc", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| 1 | 1 | 250.00 |  | Same-day delivery |"))
        .stdout(predicate::str::contains("4. SVP: ✓ approved by user 4"))
        .stdout(predicate::str::contains("> Release payment"));

    cs_cmd(&db_path)
        .args(["doc", "reject", "1", "--as", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already finalized"));
}

#[test]
fn test_cli_refuses_out_of_turn_decisions() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");
    seed(&db_path);
    create_voucher(&db_path, "Courier services");

    cs_cmd(&db_path)
        .args(["doc", "approve", "1", "--as", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to approve document"))
        .stderr(predicate::str::contains("Forbidden"));

    cs_cmd(&db_path)
        .args(["doc", "approve", "1", "--as", "1"])
        .assert()
        .success();
    cs_cmd(&db_path)
        .args(["doc", "reject", "1", "--as", "1", "--step", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already decided"));
}

#[test]
fn test_cli_rejection_inbox_and_purge() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");
    seed(&db_path);
    create_voucher(&db_path, "Courier services");
    create_voucher(&db_path, "Office cleaning");

    cs_cmd(&db_path)
        .args(["doc", "approve", "1", "--as", "1"])
        .assert()
        .success();
    cs_cmd(&db_path)
        .args(["doc", "list", "--awaiting", "accounting-head"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Courier services"))
        .stdout(predicate::str::contains("Office cleaning").not());

    cs_cmd(&db_path)
        .args(["doc", "reject", "1", "--as", "2", "--remarks", "No waybill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejected step 2 of DV-"));

    cs_cmd(&db_path)
        .args(["purge", "--older-than-days", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rejected documents to purge."));
    cs_cmd(&db_path)
        .args(["purge", "--older-than-days", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purged 1 rejected documents"))
        .stdout(predicate::str::contains("Courier services"));

    cs_cmd(&db_path)
        .args(["doc", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Office cleaning"))
        .stdout(predicate::str::contains("Courier services").not());
}

#[test]
fn test_cli_rejects_unbalanced_document() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");
    seed(&db_path);

    cs_cmd(&db_path)
        .args([
            "doc", "create", "journal", "Accrual", "--prefix", "DV", "--as", "1", "--line",
            "1:debit:100", "--line", "2:credit:90",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must equal credits"));

    cs_cmd(&db_path)
        .args(["doc", "create", "journal", "Accrual", "--prefix", "DV", "--as", "1"])
        .assert()
        .failure();
}

#[test]
fn test_cli_attach_and_delete() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("cli_test.db");
    let attachments = temp_dir.path().join("files");
    seed(&db_path);
    create_voucher(&db_path, "Courier services");

    let receipt = temp_dir.path().join("receipt.pdf");
    fs::write(&receipt, b"%PDF-1.4").expect("Failed to write receipt");

    cs_cmd(&db_path)
        .arg("--attachments-dir")
        .arg(&attachments)
        .args(["doc", "attach", "1"])
        .arg(&receipt)
        .assert()
        .success()
        .stdout(predicate::str::contains("Attached receipt.pdf to document 1"))
        .stdout(predicate::str::contains("application/pdf"));
    assert!(attachments.join("documents/1/1-receipt.pdf").exists());

    cs_cmd(&db_path)
        .arg("--attachments-dir")
        .arg(&attachments)
        .args(["doc", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted DV-"));
    assert!(!attachments.join("documents/1/1-receipt.pdf").exists());

    cs_cmd(&db_path)
        .args(["doc", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document with ID 1 not found"));
}

#[test]
fn test_cli_schema() {
    Command::cargo_bin("cs")
        .expect("Failed to find cs binary")
        .args(["schema", "decide"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Decide\""))
        .stdout(predicate::str::contains("expected_step"));
}

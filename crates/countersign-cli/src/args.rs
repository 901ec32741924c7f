//! Command-line argument definitions using clap
//!
//! Each command has a clap wrapper that converts into the matching core
//! parameter struct:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Engine
//! ```
//!
//! The core parameter types stay free of clap attributes, so help text,
//! aliases and value parsing can change here without touching the engine.

use std::{fmt, path::PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use countersign_core::{
    params::{
        ApproverAssignment, CreateAccount, CreateDocument, CreatePrefix, CreateUser, Decide, Id,
        LineItemInput, ListDocuments, PurgeRejected,
    },
    DocumentKind, DocumentStatus, Role,
};

/// Multi-step approval of disbursement vouchers and journal vouchers
///
/// Documents are created with balanced debit and credit lines, receive a
/// control number, and are routed through a fixed chain of approver roles.
/// Each approver approves or rejects their step in turn; a rejection ends
/// the document.
#[derive(Parser)]
#[command(version, about, name = "cs")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/countersign/countersign.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Directory attachment files are stored in. Defaults to an
    /// `attachments` directory next to the database
    #[arg(long, global = true)]
    pub attachments_dir: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
///
/// Without a command, pending documents are listed.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage approvers and creators
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage the chart of accounts
    #[command(alias = "a")]
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Manage control number prefixes
    #[command(alias = "p")]
    Prefix {
        #[command(subcommand)]
        command: PrefixCommands,
    },
    /// Create, inspect and decide documents
    #[command(alias = "d")]
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },
    /// Delete rejected documents whose rejection is older than a cutoff
    Purge(PurgeArgs),
    /// Print JSON schemas of the request types
    Schema(SchemaArgs),
}

// ============================================================================
// Value enums
// ============================================================================

/// Approver role as accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    AccountingAssistant,
    AccountingHead,
    Auditor,
    Svp,
}

impl From<RoleArg> for Role {
    fn from(val: RoleArg) -> Self {
        match val {
            RoleArg::AccountingAssistant => Role::AccountingAssistant,
            RoleArg::AccountingHead => Role::AccountingHead,
            RoleArg::Auditor => Role::Auditor,
            RoleArg::Svp => Role::Svp,
        }
    }
}

impl fmt::Display for RoleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Role::from(*self).as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Disbursement,
    Journal,
}

impl fmt::Display for KindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            KindArg::Disbursement => DocumentKind::Disbursement,
            KindArg::Journal => DocumentKind::Journal,
        };
        f.write_str(kind.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for StatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            StatusArg::Pending => DocumentStatus::Pending,
            StatusArg::Approved => DocumentStatus::Approved,
            StatusArg::Rejected => DocumentStatus::Rejected,
        };
        f.write_str(status.as_str())
    }
}

// ============================================================================
// Directory commands
// ============================================================================

/// Register a user
#[derive(ClapArgs)]
pub struct CreateUserArgs {
    /// Display name of the user
    pub name: String,
    /// Role the user approves as
    #[arg(short, long)]
    pub role: RoleArg,
}

impl From<CreateUserArgs> for CreateUser {
    fn from(val: CreateUserArgs) -> Self {
        CreateUser {
            name: val.name,
            role: val.role.to_string(),
        }
    }
}

#[derive(ClapArgs)]
pub struct ListUsersArgs {
    /// Only users holding this role
    #[arg(short, long)]
    pub role: Option<RoleArg>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    #[command(alias = "c")]
    Create(CreateUserArgs),
    /// List users
    #[command(aliases = ["l", "ls"])]
    List(ListUsersArgs),
}

/// Add an account to the chart of accounts
#[derive(ClapArgs)]
pub struct CreateAccountArgs {
    /// Unique account code, e.g. 1000
    pub code: String,
    /// Account name
    pub name: String,
}

impl From<CreateAccountArgs> for CreateAccount {
    fn from(val: CreateAccountArgs) -> Self {
        CreateAccount {
            code: val.code,
            name: val.name,
        }
    }
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Add an account
    #[command(alias = "c")]
    Create(CreateAccountArgs),
    /// List accounts
    #[command(aliases = ["l", "ls"])]
    List,
}

/// Configure a control number prefix
#[derive(ClapArgs)]
pub struct CreatePrefixArgs {
    /// Prefix code, e.g. DV or JV
    pub code: String,
    /// What documents under this prefix are for
    #[arg(short, long)]
    pub description: Option<String>,
}

impl From<CreatePrefixArgs> for CreatePrefix {
    fn from(val: CreatePrefixArgs) -> Self {
        CreatePrefix {
            code: val.code,
            description: val.description,
        }
    }
}

#[derive(ClapArgs)]
pub struct PrefixCodeArgs {
    /// Prefix code
    pub code: String,
}

#[derive(Subcommand)]
pub enum PrefixCommands {
    /// Configure a prefix
    #[command(alias = "c")]
    Create(CreatePrefixArgs),
    /// List prefixes
    #[command(aliases = ["l", "ls"])]
    List,
    /// Allow new documents under a prefix
    Activate(PrefixCodeArgs),
    /// Stop issuing control numbers under a prefix
    Deactivate(PrefixCodeArgs),
}

// ============================================================================
// Document commands
// ============================================================================

/// Parses `ACCOUNT_ID:debit|credit:AMOUNT[:DESCRIPTION]`.
fn parse_line(s: &str) -> Result<LineItemInput, String> {
    let mut parts = s.splitn(4, ':');
    let (Some(account), Some(entry_type), Some(amount)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!(
            "expected ACCOUNT_ID:debit|credit:AMOUNT[:DESCRIPTION], got '{s}'"
        ));
    };
    let account_id = account
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("'{account}' is not an account ID"))?;
    Ok(LineItemInput {
        account_id,
        entry_type: entry_type.trim().to_string(),
        amount: amount.trim().to_string(),
        description: parts.next().map(str::to_string),
        order_number: None,
    })
}

/// Parses `POSITION:USER_ID`.
fn parse_approver(s: &str) -> Result<ApproverAssignment, String> {
    let (position, user_id) = s
        .split_once(':')
        .ok_or_else(|| format!("expected POSITION:USER_ID, got '{s}'"))?;
    Ok(ApproverAssignment {
        position: position
            .trim()
            .parse()
            .map_err(|_| format!("'{position}' is not a step position"))?,
        user_id: user_id
            .trim()
            .parse()
            .map_err(|_| format!("'{user_id}' is not a user ID"))?,
    })
}

/// Create a document and open its approval chain
///
/// Debit and credit lines must balance. The control number is generated
/// from the prefix and the current year.
#[derive(ClapArgs)]
pub struct CreateDocumentArgs {
    /// Kind of voucher
    pub kind: KindArg,
    /// Title of the document
    pub title: String,
    /// Control number prefix, e.g. DV
    #[arg(short, long)]
    pub prefix: String,
    /// ID of the creating user
    #[arg(long = "as", value_name = "USER_ID")]
    pub created_by: u64,
    /// Optional longer description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Line item as ACCOUNT_ID:debit|credit:AMOUNT[:DESCRIPTION]; repeatable
    #[arg(short, long = "line", value_name = "LINE", required = true, value_parser = parse_line)]
    pub lines: Vec<LineItemInput>,
    /// Pin a step to a user as POSITION:USER_ID; repeatable
    #[arg(long = "approver", value_name = "POSITION:USER_ID", value_parser = parse_approver)]
    pub approvers: Vec<ApproverAssignment>,
}

impl From<CreateDocumentArgs> for CreateDocument {
    fn from(val: CreateDocumentArgs) -> Self {
        CreateDocument {
            kind: val.kind.to_string(),
            title: val.title,
            description: val.description,
            prefix: val.prefix,
            created_by: val.created_by,
            line_items: val.lines,
            approvers: val.approvers,
        }
    }
}

/// Show a document with its lines, approval trail and attachments
#[derive(ClapArgs)]
pub struct ShowDocumentArgs {
    /// ID of the document
    pub id: u64,
}

impl From<ShowDocumentArgs> for Id {
    fn from(val: ShowDocumentArgs) -> Self {
        Id { id: val.id }
    }
}

/// List documents, newest first
#[derive(ClapArgs)]
pub struct ListDocumentsArgs {
    /// Only documents in this status
    #[arg(short, long)]
    pub status: Option<StatusArg>,
    /// Only this kind of voucher
    #[arg(short, long)]
    pub kind: Option<KindArg>,
    /// Inbox of a role: pending documents whose current step it owns
    #[arg(short, long)]
    pub awaiting: Option<RoleArg>,
    /// Case-insensitive title search
    #[arg(short, long)]
    pub title: Option<String>,
}

impl From<ListDocumentsArgs> for ListDocuments {
    fn from(val: ListDocumentsArgs) -> Self {
        ListDocuments {
            status: val.status.map(|s| s.to_string()),
            kind: val.kind.map(|k| k.to_string()),
            awaiting_role: val.awaiting.map(|r| r.to_string()),
            title_contains: val.title,
        }
    }
}

/// Approve or reject the step awaiting a decision
#[derive(ClapArgs)]
pub struct DecideArgs {
    /// ID of the document
    pub id: u64,
    /// ID of the deciding user
    #[arg(long = "as", value_name = "USER_ID")]
    pub actor_id: u64,
    /// Remarks recorded with the decision
    #[arg(short, long)]
    pub remarks: Option<String>,
    /// Step the decision is meant for; refused if the document moved on
    #[arg(long)]
    pub step: Option<u32>,
}

impl DecideArgs {
    pub fn into_params(self, action: &str) -> Decide {
        Decide {
            document_id: self.id,
            actor_id: self.actor_id,
            action: action.to_string(),
            remarks: self.remarks,
            expected_step: self.step,
        }
    }
}

/// Attach a file to a document
#[derive(ClapArgs)]
pub struct AttachArgs {
    /// ID of the document
    pub id: u64,
    /// File to attach
    pub file: PathBuf,
    /// Stored file name; defaults to the file's own name
    #[arg(short, long)]
    pub name: Option<String>,
    /// MIME type; guessed from the extension when omitted
    #[arg(short = 't', long = "type")]
    pub file_type: Option<String>,
}

/// Delete a document with its attachments and approval trail
#[derive(ClapArgs)]
pub struct DeleteDocumentArgs {
    /// ID of the document
    pub id: u64,
}

impl From<DeleteDocumentArgs> for Id {
    fn from(val: DeleteDocumentArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum DocCommands {
    /// Create a document
    #[command(alias = "c")]
    Create(CreateDocumentArgs),
    /// Show a document
    #[command(alias = "s")]
    Show(ShowDocumentArgs),
    /// List documents
    #[command(aliases = ["l", "ls"])]
    List(ListDocumentsArgs),
    /// Approve the current step
    #[command(alias = "ok")]
    Approve(DecideArgs),
    /// Reject the current step, ending the document
    Reject(DecideArgs),
    /// Attach a file
    Attach(AttachArgs),
    /// Delete a document permanently
    #[command(aliases = ["rm"])]
    Delete(DeleteDocumentArgs),
}

// ============================================================================
// Maintenance commands
// ============================================================================

#[derive(ClapArgs)]
pub struct PurgeArgs {
    /// Minimum age of the rejection, in days
    #[arg(long, default_value_t = 30)]
    pub older_than_days: u32,
}

impl From<PurgeArgs> for PurgeRejected {
    fn from(val: PurgeArgs) -> Self {
        PurgeRejected {
            older_than_days: val.older_than_days,
        }
    }
}

/// Request types with a published schema
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum SchemaTarget {
    CreateDocument,
    Decide,
    ListDocuments,
    AddAttachment,
    CreateUser,
    CreateAccount,
    CreatePrefix,
    PurgeRejected,
}

#[derive(ClapArgs)]
pub struct SchemaArgs {
    /// Print only this request's schema
    pub request: Option<SchemaTarget>,
}

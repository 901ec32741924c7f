//! Command handlers
//!
//! Each handler converts its clap arguments into core parameters, calls the
//! engine and renders the result as markdown.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use countersign_core::{
    display::{Accounts, Prefixes, Users},
    params::{AddAttachment, Id, ListDocuments},
    CreateResult, DeleteResult, Engine, OperationStatus,
};

use crate::{
    args::{AccountCommands, AttachArgs, DocCommands, PrefixCommands, PurgeArgs, UserCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    engine: Engine,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(engine: Engine, renderer: TerminalRenderer) -> Self {
        Self { engine, renderer }
    }

    pub async fn handle_user_command(&self, command: UserCommands) -> Result<()> {
        match command {
            UserCommands::Create(args) => {
                let user = self
                    .engine
                    .create_user(&args.into())
                    .await
                    .context("Failed to create user")?;
                self.renderer.render(&CreateResult::new(user).to_string())
            }
            UserCommands::List(args) => {
                let users = self
                    .engine
                    .list_users(args.role.map(Into::into))
                    .await
                    .context("Failed to list users")?;
                self.renderer.render(&Users(users).to_string())
            }
        }
    }

    pub async fn handle_account_command(&self, command: AccountCommands) -> Result<()> {
        match command {
            AccountCommands::Create(args) => {
                let account = self
                    .engine
                    .create_account(&args.into())
                    .await
                    .context("Failed to create account")?;
                self.renderer.render(&CreateResult::new(account).to_string())
            }
            AccountCommands::List => {
                let accounts = self
                    .engine
                    .list_accounts()
                    .await
                    .context("Failed to list accounts")?;
                self.renderer.render(&Accounts(accounts).to_string())
            }
        }
    }

    pub async fn handle_prefix_command(&self, command: PrefixCommands) -> Result<()> {
        match command {
            PrefixCommands::Create(args) => {
                let prefix = self
                    .engine
                    .create_prefix(&args.into())
                    .await
                    .context("Failed to configure prefix")?;
                self.renderer.render(&CreateResult::new(prefix).to_string())
            }
            PrefixCommands::List => {
                let prefixes = self
                    .engine
                    .list_prefixes()
                    .await
                    .context("Failed to list prefixes")?;
                self.renderer.render(&Prefixes(prefixes).to_string())
            }
            PrefixCommands::Activate(args) => self.set_prefix_active(&args.code, true).await,
            PrefixCommands::Deactivate(args) => self.set_prefix_active(&args.code, false).await,
        }
    }

    async fn set_prefix_active(&self, code: &str, active: bool) -> Result<()> {
        let prefix = self
            .engine
            .set_prefix_active(code, active)
            .await
            .with_context(|| format!("Failed to update prefix {code}"))?;
        let state = if prefix.active { "activated" } else { "deactivated" };
        let status = OperationStatus::success(format!("Prefix {} {state}", prefix.code));
        self.renderer.render(&status.to_string())
    }

    pub async fn handle_doc_command(&self, command: DocCommands) -> Result<()> {
        match command {
            DocCommands::Create(args) => {
                let document = self
                    .engine
                    .create_document(&args.into())
                    .await
                    .context("Failed to create document")?;
                self.renderer.render(&CreateResult::new(document).to_string())
            }
            DocCommands::Show(args) => {
                let id = Id::from(args);
                let document = self
                    .engine
                    .require_document(&id)
                    .await
                    .context("Failed to load document")?;
                self.renderer.render(&document.to_string())
            }
            DocCommands::List(args) => self.list_documents(&args.into()).await,
            DocCommands::Approve(args) => {
                let outcome = self
                    .engine
                    .decide(&args.into_params("approve"))
                    .await
                    .context("Failed to approve document")?;
                self.renderer.render(&outcome.to_string())
            }
            DocCommands::Reject(args) => {
                let outcome = self
                    .engine
                    .decide(&args.into_params("reject"))
                    .await
                    .context("Failed to reject document")?;
                self.renderer.render(&outcome.to_string())
            }
            DocCommands::Attach(args) => self.attach(args).await,
            DocCommands::Delete(args) => {
                let document = self
                    .engine
                    .delete_document(&args.into())
                    .await
                    .context("Failed to delete document")?;
                self.renderer.render(&DeleteResult::new(document).to_string())
            }
        }
    }

    pub async fn list_documents(&self, params: &ListDocuments) -> Result<()> {
        let documents = self
            .engine
            .list_documents(params)
            .await
            .context("Failed to list documents")?;
        self.renderer.render(&documents.to_string())
    }

    async fn attach(&self, args: AttachArgs) -> Result<()> {
        let contents = fs::read(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let file_name = match args.name {
            Some(name) => name,
            None => args
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("Attachment path has no file name")?,
        };
        let file_type = args
            .file_type
            .unwrap_or_else(|| guess_file_type(&args.file).to_string());

        let attachment = self
            .engine
            .add_attachment(&AddAttachment {
                document_id: args.id,
                file_name,
                file_type,
                contents,
            })
            .await
            .context("Failed to attach file")?;
        self.renderer.render(&CreateResult::new(attachment).to_string())
    }

    pub async fn handle_purge(&self, args: PurgeArgs) -> Result<()> {
        let purged = self
            .engine
            .purge_rejected(&args.into())
            .await
            .context("Failed to purge rejected documents")?;
        self.renderer.render(&DeleteResult::new(purged).to_string())
    }
}

/// MIME type for common voucher attachments, by extension.
fn guess_file_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_file_type() {
        assert_eq!(guess_file_type(Path::new("scan.PDF")), "application/pdf");
        assert_eq!(guess_file_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_file_type(Path::new("README")), "application/octet-stream");
    }
}

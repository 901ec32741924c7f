//! Countersign CLI
//!
//! Command-line front end for the countersign approval engine.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands, SchemaArgs, SchemaTarget};
use clap::Parser;
use cli::Cli;
use countersign_core::{
    params::{
        AddAttachment, CreateAccount, CreateDocument, CreatePrefix, CreateUser, Decide,
        ListDocuments, PurgeRejected,
    },
    EngineBuilder,
};
use log::info;
use renderer::TerminalRenderer;
use schemars::schema_for;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        attachments_dir,
        no_color,
        command,
    } = Args::parse();

    if let Some(Schema(args)) = &command {
        return print_schemas(args);
    }

    let engine = EngineBuilder::new()
        .with_database_path(database_file)
        .with_attachments_dir(attachments_dir)
        .build()
        .await
        .context("Failed to initialize approval engine")?;
    info!("Using database {}", engine.database_path().display());

    let cli = Cli::new(engine, TerminalRenderer::new(!no_color));

    match command {
        Some(User { command }) => cli.handle_user_command(command).await,
        Some(Account { command }) => cli.handle_account_command(command).await,
        Some(Prefix { command }) => cli.handle_prefix_command(command).await,
        Some(Doc { command }) => cli.handle_doc_command(command).await,
        Some(Purge(args)) => cli.handle_purge(args).await,
        Some(Schema(_)) => Ok(()),
        None => {
            cli.list_documents(&ListDocuments {
                status: Some("pending".to_string()),
                ..Default::default()
            })
            .await
        }
    }
}

fn print_schemas(args: &SchemaArgs) -> Result<()> {
    let all = [
        SchemaTarget::CreateDocument,
        SchemaTarget::Decide,
        SchemaTarget::ListDocuments,
        SchemaTarget::AddAttachment,
        SchemaTarget::CreateUser,
        SchemaTarget::CreateAccount,
        SchemaTarget::CreatePrefix,
        SchemaTarget::PurgeRejected,
    ];
    let targets = match args.request {
        Some(target) => vec![target],
        None => all.to_vec(),
    };

    let mut schemas = serde_json::Map::new();
    for target in targets {
        let (name, schema) = match target {
            SchemaTarget::CreateDocument => ("CreateDocument", schema_for!(CreateDocument)),
            SchemaTarget::Decide => ("Decide", schema_for!(Decide)),
            SchemaTarget::ListDocuments => ("ListDocuments", schema_for!(ListDocuments)),
            SchemaTarget::AddAttachment => ("AddAttachment", schema_for!(AddAttachment)),
            SchemaTarget::CreateUser => ("CreateUser", schema_for!(CreateUser)),
            SchemaTarget::CreateAccount => ("CreateAccount", schema_for!(CreateAccount)),
            SchemaTarget::CreatePrefix => ("CreatePrefix", schema_for!(CreatePrefix)),
            SchemaTarget::PurgeRejected => ("PurgeRejected", schema_for!(PurgeRejected)),
        };
        schemas.insert(
            name.to_string(),
            serde_json::to_value(&schema).context("Failed to serialize schema")?,
        );
    }

    let output = serde_json::to_string_pretty(&schemas).context("Failed to serialize schemas")?;
    println!("{output}");
    Ok(())
}

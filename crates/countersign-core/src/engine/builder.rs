//! Builder for creating and configuring Engine instances.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::task;

use super::Engine;
use crate::{
    attachments::{AttachmentStore, LocalAttachmentStore},
    control_number::{ControlNumberGenerator, DEFAULT_MAX_ATTEMPTS},
    db::Database,
    error::{ApprovalError, Result},
    events::{AuditSink, EventDispatcher, LogSink, NotificationSink},
    flow::StepTemplate,
};

/// Builder for creating and configuring Engine instances.
#[derive(Clone, Default)]
pub struct EngineBuilder {
    database_path: Option<PathBuf>,
    attachments_dir: Option<PathBuf>,
    attachment_store: Option<Arc<dyn AttachmentStore>>,
    template: Option<StepTemplate>,
    control_number_attempts: Option<u32>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/countersign/countersign.db` or
    /// `~/.local/share/countersign/countersign.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the directory attachments are written to.
    ///
    /// Defaults to an `attachments` directory next to the database file.
    pub fn with_attachments_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        if let Some(dir) = dir {
            self.attachments_dir = Some(dir.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the file-based attachment store altogether.
    pub fn with_attachment_store(mut self, store: Arc<dyn AttachmentStore>) -> Self {
        self.attachment_store = Some(store);
        self
    }

    /// Sets the role sequence new documents are routed through.
    pub fn with_step_template(mut self, template: StepTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Bounds the control-number candidates tried per document.
    pub fn with_control_number_attempts(mut self, attempts: u32) -> Self {
        self.control_number_attempts = Some(attempts);
        self
    }

    /// Sets where audit facts are recorded. Defaults to the log.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Sets where notifications are delivered. Defaults to the log.
    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Builds the configured engine instance.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::FileSystem` if the database path is invalid
    /// Returns `ApprovalError::Database` if database initialization fails
    /// Returns `ApprovalError::Configuration` for a zero attempt bound
    pub async fn build(self) -> Result<Engine> {
        let attempts = self.control_number_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if attempts == 0 {
            return Err(ApprovalError::Configuration {
                message: "Control number attempts must be at least 1".to_string(),
            });
        }

        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApprovalError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), ApprovalError>(())
        })
        .await
        .map_err(|e| ApprovalError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let attachments = match self.attachment_store {
            Some(store) => store,
            None => {
                let dir = self.attachments_dir.unwrap_or_else(|| {
                    db_path
                        .parent()
                        .unwrap_or_else(|| Path::new("."))
                        .join("attachments")
                });
                Arc::new(LocalAttachmentStore::new(dir)) as Arc<dyn AttachmentStore>
            }
        };

        let events = EventDispatcher::new(
            self.audit_sink.unwrap_or_else(|| Arc::new(LogSink)),
            self.notification_sink.unwrap_or_else(|| Arc::new(LogSink)),
        );

        Ok(Engine {
            db_path,
            template: self.template.unwrap_or_default(),
            control_numbers: ControlNumberGenerator::new(attempts),
            attachments,
            events,
        })
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("countersign")
            .place_data_file("countersign.db")
            .map_err(|e| ApprovalError::XdgDirectory(e.to_string()))
    }
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("database_path", &self.database_path)
            .field("attachments_dir", &self.attachments_dir)
            .field("template", &self.template)
            .field("control_number_attempts", &self.control_number_attempts)
            .finish_non_exhaustive()
    }
}

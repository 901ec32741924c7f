//! Attachment file storage.

use std::{
    fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use crate::error::{ApprovalError, Result};

/// Byte storage for attachment files, keyed by relative path.
pub trait AttachmentStore: Send + Sync {
    /// Writes `contents` at `path`, replacing any existing file.
    fn store(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Removes the file at `path`. Removing a missing file is not an error.
    fn delete(&self, path: &str) -> Result<()>;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &str) -> Result<bool>;
}

/// Stores attachments as plain files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    root: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory all paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(ApprovalError::validation("file_path")
                .with_reason(format!("'{path}' is not a relative path inside the store")));
        }
        Ok(self.root.join(relative))
    }
}

impl AttachmentStore for LocalAttachmentStore {
    fn store(&self, path: &str, contents: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| ApprovalError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&full, contents).map_err(|e| ApprovalError::FileSystem {
            path: full,
            source: e,
        })
    }

    fn delete(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApprovalError::FileSystem {
                path: full,
                source: e,
            }),
        }
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let full = self.resolve(path)?;
        full.try_exists().map_err(|e| ApprovalError::FileSystem {
            path: full,
            source: e,
        })
    }
}

/// Relative storage path for a new attachment of `document_id`.
///
/// The file name is reduced to ASCII letters, digits, `.`, `-` and `_`, and
/// prefixed with `unique` so repeated uploads of one name do not clash.
pub fn attachment_path(document_id: u64, unique: i64, file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');
    let name = if sanitized.is_empty() { "file" } else { sanitized };
    format!("documents/{document_id}/{unique}-{name}")
}

//! Host-facing contracts: where content comes from and how the host
//! drives a preview view.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Kind of change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Content edited (not necessarily persisted).
    Edit,
    /// Explicit save.
    Save,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Save => "save",
        }
    }
}

/// Current text of the active document.
pub trait DocumentSource {
    /// `None` when there is no active document.
    fn read(&self) -> Option<String>;

    /// Short name for status output.
    fn name(&self) -> String {
        "document".to_string()
    }
}

/// Lifecycle hooks a host calls on a preview view.
pub trait PreviewLifecycle {
    /// View opened: render right away.
    fn on_activate(&mut self, now: Instant);

    /// Content edited or saved.
    fn on_content_changed(&mut self, kind: ChangeKind, now: Instant);

    /// View closed: release everything. Terminal.
    fn on_teardown(&mut self);
}

/// A document backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileDocument {
    fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                crate::debug!("preview"; "no document at {}", self.path.display());
                None
            }
            Err(e) => {
                crate::log!("error"; "failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_document_reads_current_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        fs::write(&path, "one").unwrap();

        let doc = FileDocument::new(&path);
        assert_eq!(doc.read().as_deref(), Some("one"));
        fs::write(&path, "two").unwrap();
        assert_eq!(doc.read().as_deref(), Some("two"));
        assert_eq!(doc.name(), "note.md");
    }

    #[test]
    fn test_missing_file_is_no_document() {
        let dir = TempDir::new().unwrap();
        let doc = FileDocument::new(dir.path().join("gone.md"));
        assert_eq!(doc.read(), None);
    }
}

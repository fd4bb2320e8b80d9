//! Artifacts as files in an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::preview::{ArtifactHandle, RenderSurface, SurfaceError};

/// Writes each artifact to `<dir>/preview-<seq>.html` and deletes it on release.
#[derive(Debug)]
pub struct DirSurface {
    dir: PathBuf,
    next: u64,
    current: Option<PathBuf>,
}

impl DirSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next: 0,
            current: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact last displayed.
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn path_for(&self, seq: u64) -> PathBuf {
        self.dir.join(format!("preview-{seq}.html"))
    }
}

impl RenderSurface for DirSurface {
    fn create(&mut self, document: &str) -> Result<ArtifactHandle, SurfaceError> {
        fs::create_dir_all(&self.dir).map_err(|source| SurfaceError::Io {
            action: "create directory for",
            source,
        })?;

        self.next += 1;
        let path = self.path_for(self.next);
        fs::write(&path, document).map_err(|source| SurfaceError::Io {
            action: "write",
            source,
        })?;
        Ok(ArtifactHandle::new(self.next, path.display().to_string()))
    }

    fn display(&mut self, handle: &ArtifactHandle) -> Result<(), SurfaceError> {
        let path = PathBuf::from(handle.location());
        if !path.is_file() {
            return Err(SurfaceError::Unavailable(format!(
                "{} disappeared before display",
                path.display()
            )));
        }
        self.current = Some(path);
        Ok(())
    }

    fn release(&mut self, handle: ArtifactHandle) {
        let path = Path::new(handle.location());
        if self.current.as_deref() == Some(path) {
            self.current = None;
        }
        if let Err(e) = fs::remove_file(path) {
            crate::debug!("preview"; "failed to remove {}: {}", path.display(), e);
        }
    }
}

//! Preview artifacts and their single-owner slot.
//!
//! An `ArtifactHandle` is move-only: `RenderSurface::release` consumes it,
//! so a handle can never be released twice. `ArtifactSlot` is the only
//! place that holds the live handle.

use std::fmt;

use thiserror::Error;

/// Host-allocated, addressable rendering of one document.
#[derive(Debug, PartialEq, Eq)]
pub struct ArtifactHandle {
    id: u64,
    location: String,
}

impl ArtifactHandle {
    pub fn new(id: u64, location: impl Into<String>) -> Self {
        Self {
            id,
            location: location.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Address the surface serves this artifact under (path or URL).
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Rendering surface failure. Aborts the cycle, never the orchestrator.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("rendering surface unavailable: {0}")]
    Unavailable(String),

    #[error("failed to {action} artifact")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Isolated display for rendered documents.
pub trait RenderSurface {
    /// Allocate an addressable artifact holding `document`.
    fn create(&mut self, document: &str) -> Result<ArtifactHandle, SurfaceError>;

    /// Show `handle` as the current preview.
    fn display(&mut self, handle: &ArtifactHandle) -> Result<(), SurfaceError>;

    /// Revoke `handle`. Infallible from the caller's point of view.
    fn release(&mut self, handle: ArtifactHandle);
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn create(&mut self, document: &str) -> Result<ArtifactHandle, SurfaceError> {
        (**self).create(document)
    }

    fn display(&mut self, handle: &ArtifactHandle) -> Result<(), SurfaceError> {
        (**self).display(handle)
    }

    fn release(&mut self, handle: ArtifactHandle) {
        (**self).release(handle)
    }
}

/// Holder of at most one live artifact.
#[derive(Debug, Default)]
pub struct ArtifactSlot {
    live: Option<ArtifactHandle>,
}

impl ArtifactSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> Option<&ArtifactHandle> {
        self.live.as_ref()
    }

    /// Create and display a new artifact, then release the previous one.
    ///
    /// The previous handle is released on every path. When the surface
    /// fails, a half-created handle is released too and the slot is left
    /// empty.
    pub fn install<S>(
        &mut self,
        surface: &mut S,
        document: &str,
    ) -> Result<&ArtifactHandle, SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        let previous = self.live.take();

        let installed = surface.create(document).and_then(|handle| {
            match surface.display(&handle) {
                Ok(()) => Ok(handle),
                Err(e) => {
                    surface.release(handle);
                    Err(e)
                }
            }
        });

        if let Some(previous) = previous {
            surface.release(previous);
        }

        Ok(self.live.insert(installed?))
    }

    /// Release the live artifact, if any.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        if let Some(handle) = self.live.take() {
            surface.release(handle);
        }
    }
}

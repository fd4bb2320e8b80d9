//! Live preview: scheduling, artifact lifecycle and the update cycle.
//!
//! # Module Structure
//!
//! - `state` - debounce / save-only scheduling state machine
//! - `artifact` - artifact handles, rendering surface contract, single-owner slot
//! - `host` - document source and lifecycle hooks
//! - `pipeline` - extract → transform → assemble for one snapshot
//! - `orchestrator` - `PreviewOrchestrator`, tying the above together

mod artifact;
mod host;
mod orchestrator;
mod pipeline;
mod state;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactHandle, ArtifactSlot, RenderSurface, SurfaceError};
pub use host::{ChangeKind, DocumentSource, FileDocument, PreviewLifecycle};
pub use orchestrator::{CycleOutcome, PreviewOrchestrator};
pub use pipeline::{Rendered, render_document};
pub use state::Phase;

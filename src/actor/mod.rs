//! Actor System for Live Preview
//!
//! ```text
//! FsActor --> PreviewActor --> RenderSurface
//! (watch)     (debounce, render, artifact lifecycle)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher for the document and settings file
//! - `preview` - Event loop around `PreviewOrchestrator`
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod preview;

pub use coordinator::Coordinator;

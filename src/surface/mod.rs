//! Rendering surfaces for preview artifacts.
//!
//! - `dir` - files in an output directory (`watch`)
//! - `blob` - in-memory addressable blobs behind the dev server (`serve`)

pub mod blob;
pub mod dir;

pub use blob::{BlobStore, BlobSurface};
pub use dir::DirSurface;

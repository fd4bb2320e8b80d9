//! Actor Message Definitions
//!
//! ```text
//! FsActor --PreviewMsg--> PreviewActor
//! ```

use crate::preview::ChangeKind;

/// Messages to the preview actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMsg {
    /// The previewed document changed
    Changed(ChangeKind),
    /// The settings file changed
    ConfigChanged,
}

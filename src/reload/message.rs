//! Live navigation message protocol.
//!
//! JSON messages pushed from the dev server to the shell page.
//!
//! # Message Types
//!
//! - `navigate`: point the preview iframe at a new artifact
//! - `closed`: the preview was torn down, blank the iframe
//! - `connected`: handshake acknowledgement

use serde::{Deserialize, Serialize};

/// Message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Active artifact changed
    Navigate { url: String },

    /// Preview torn down
    Closed,

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl ReloadMessage {
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"closed"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_wire_format() {
        let json = ReloadMessage::navigate("/blob/7").to_json();
        assert_eq!(json, r#"{"type":"navigate","url":"/blob/7"}"#);
    }

    #[test]
    fn test_closed_wire_format() {
        assert_eq!(ReloadMessage::Closed.to_json(), r#"{"type":"closed"}"#);
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            ReloadMessage::from_json(r#"{"type":"navigate","url":"/blob/1"}"#),
            Some(ReloadMessage::navigate("/blob/1"))
        );
        assert_eq!(ReloadMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}

//! Live navigation for the `serve` shell page.
//!
//! - `message` - JSON protocol
//! - `server` - WebSocket acceptor and client hub

pub mod message;
pub mod server;

pub use message::ReloadMessage;
pub use server::{ClientHub, start_ws_server};

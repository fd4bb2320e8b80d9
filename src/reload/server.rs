//! WebSocket server for live navigation.
//!
//! An acceptor thread performs the handshake and registers each client with
//! a shared `ClientHub`; the preview side broadcasts through the hub.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Upper bound for a handshake read or a frame write to one client.
/// A stalled tab is dropped instead of holding up the render cycle.
const CLIENT_IO_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Default)]
struct HubState {
    clients: Vec<WebSocket<TcpStream>>,
    last: Option<ReloadMessage>,
}

/// Connected shell pages plus the last navigation, replayed to late joiners.
///
/// Clients and the remembered message share one lock, so a client is either
/// greeted with a message or receives its broadcast, never neither.
#[derive(Default)]
pub struct ClientHub {
    state: Mutex<HubState>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_count(&self) -> usize {
        self.state.lock().clients.len()
    }

    /// Remembered message for newly connected clients.
    pub fn last_message(&self) -> Option<ReloadMessage> {
        self.state.lock().last.clone()
    }

    /// Broadcast to all clients, dropping the ones that went away or stalled.
    pub fn broadcast(&self, message: &ReloadMessage) {
        let msg = Message::Text(message.to_json().into());
        let mut state = self.state.lock();
        state.last = Some(message.clone());

        let count = state.clients.len();
        if count == 0 {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        state.clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(_) => true,
            Err(e) => {
                crate::debug!("reload"; "client dropped: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients", count);
    }

    /// Handshake, greet and register a raw connection.
    fn add_client(&self, stream: TcpStream) {
        if let Err(e) = stream
            .set_read_timeout(Some(CLIENT_IO_TIMEOUT))
            .and_then(|()| stream.set_write_timeout(Some(CLIENT_IO_TIMEOUT)))
        {
            crate::log!("reload"; "failed to configure client socket: {}", e);
            return;
        }

        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
                return;
            }
        };

        let mut state = self.state.lock();
        let greeting = std::iter::once(ReloadMessage::connected()).chain(state.last.clone());
        for message in greeting {
            if let Err(e) = ws.send(Message::Text(message.to_json().into())) {
                crate::log!("reload"; "failed to greet client: {}", e);
                return;
            }
        }

        crate::debug!("reload"; "client connected (total: {})", state.clients.len() + 1);
        state.clients.push(ws);
    }

    /// Close every connection.
    pub fn close_all(&self) {
        for mut ws in self.state.lock().clients.drain(..) {
            let _ = ws.close(None);
        }
    }
}

/// Start the WebSocket server on `interface`, registering clients with `hub`.
///
/// Returns the bound port (may differ from `base_port` if it was taken).
pub fn start_ws_server(interface: &str, base_port: u16, hub: Arc<ClientHub>) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            if crate::core::is_shutdown() {
                hub.close_all();
                break;
            }
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    // Set blocking for WebSocket operations
                    let _ = stream.set_nonblocking(false);
                    hub.add_client(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Try binding to port, retry with incremented port if in use
pub(crate) fn try_bind_port(
    interface: &str,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

use crate::message::{EventType, Push};
use log::*;
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Type alias for user IDs (principal names or connection ids)
pub type UserId = String;

/// Unique identifier for a connection (server-generated or transport-supplied)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-owning handle to one client's live push channel.
///
/// The transport keeps the receiving half and owns the connection's lifetime;
/// handles only forward pushes into it. Cloning a handle is cheap.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: UnboundedSender<Push>,
}

impl Connection {
    pub fn new(id: ConnectionId, sender: UnboundedSender<Push>) -> Self {
        Self { id, sender }
    }

    /// Open a channel with a fresh id, returning the handle and the transport's receiver.
    pub fn open() -> (Self, UnboundedReceiver<Push>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(ConnectionId::new(), sender), receiver)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Fire-and-forget delivery. A closed receiver is logged and otherwise ignored;
    /// cleanup is driven by the transport's disconnect notification.
    pub fn push(&self, push: Push) {
        let event_type = push.event_type().to_string();
        if let Err(e) = self.sender.send(push) {
            warn!(
                "Failed to push {} event to connection {}: {}. Connection will be cleaned up.",
                event_type,
                self.id.as_str(),
                e
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

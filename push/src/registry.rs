use crate::connection::{Connection, ConnectionId, UserId};
use dashmap::DashMap;

/// Initial capacity used when none is configured, sized for a few dozen users.
pub const DEFAULT_CAPACITY: usize = 41;

/// Concurrent mapping from user id to that user's live connection.
///
/// Implementations must be linearizable per key: a `get` that starts after a
/// `put` or `remove` for the same user completes observes its effect.
/// Operations on different users are independent.
pub trait SessionRegistry: Send + Sync {
    /// Upsert, last writer wins. Returns the connection that was replaced, if any.
    fn put(&self, user_id: UserId, connection: Connection) -> Option<Connection>;

    fn get(&self, user_id: &str) -> Option<Connection>;

    /// Removes the mapping if present. Removing an absent user is a no-op.
    fn remove(&self, user_id: &str) -> Option<Connection>;

    /// Removes the mapping only while it still names `connection_id`.
    /// Returns whether a mapping was removed.
    fn remove_if_current(&self, user_id: &str, connection_id: &ConnectionId) -> bool;

    fn size(&self) -> usize;

    fn clear(&self);
}

/// In-memory registry backed by a sharded `DashMap`, so writers to one user
/// never serialize readers of another.
pub struct InMemorySessionRegistry {
    sessions: DashMap<UserId, Connection>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: DashMap::with_capacity(capacity),
        }
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn put(&self, user_id: UserId, connection: Connection) -> Option<Connection> {
        self.sessions.insert(user_id, connection)
    }

    fn get(&self, user_id: &str) -> Option<Connection> {
        self.sessions.get(user_id).map(|entry| entry.value().clone())
    }

    fn remove(&self, user_id: &str) -> Option<Connection> {
        self.sessions.remove(user_id).map(|(_, connection)| connection)
    }

    fn remove_if_current(&self, user_id: &str, connection_id: &ConnectionId) -> bool {
        self.sessions
            .remove_if(user_id, |_, connection| connection.id() == connection_id)
            .is_some()
    }

    fn size(&self) -> usize {
        self.sessions.len()
    }

    fn clear(&self) {
        self.sessions.clear();
    }
}

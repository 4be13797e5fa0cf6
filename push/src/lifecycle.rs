use crate::connection::{Connection, UserId};
use crate::error::{invalid_connection, unresolved_identity, Result};
use crate::principal::{AuthContext, PrincipalResolver};
use crate::registry::SessionRegistry;
use log::*;
use std::fmt;
use std::sync::Arc;

/// Why the transport reported a connection as gone. Only used for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectNotice {
    ClientClosed,
    Timeout,
    ServerShutdown,
    Other(String),
}

impl fmt::Display for DisconnectNotice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DisconnectNotice::ClientClosed => write!(f, "client closed"),
            DisconnectNotice::Timeout => write!(f, "timeout"),
            DisconnectNotice::ServerShutdown => write!(f, "server shutdown"),
            DisconnectNotice::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// Keeps the session registry in step with the transport's connect and
/// disconnect notifications. This is the only component that mutates the
/// registry during normal operation.
pub struct LifecycleListener {
    registry: Arc<dyn SessionRegistry>,
}

impl LifecycleListener {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Register `connection` under the user id resolved from `auth`.
    /// A user reconnecting replaces their previous session.
    pub fn on_register(
        &self,
        connection: Option<&Connection>,
        auth: Option<&AuthContext>,
    ) -> Result<UserId> {
        debug!("Registering connection {connection:?} with auth context {auth:?}");

        let (connection, user_id) = Self::resolve(connection, auth)?;

        if let Some(replaced) = self.registry.put(user_id.clone(), connection.clone()) {
            debug!(
                "Connection {} replaced connection {} for user {}",
                connection.id(),
                replaced.id(),
                user_id
            );
        }

        info!(
            "Registered connection {} for user {} ({} live session(s))",
            connection.id(),
            user_id,
            self.registry.size()
        );
        Ok(user_id)
    }

    /// Deregister `connection`. Returns the user id that was removed, or
    /// `None` when the user had no session held by this connection.
    pub fn on_disconnect(
        &self,
        connection: Option<&Connection>,
        auth: Option<&AuthContext>,
        notice: &DisconnectNotice,
    ) -> Result<Option<UserId>> {
        debug!("Disconnecting connection {connection:?} ({notice})");

        let (connection, user_id) = Self::resolve(connection, auth)?;

        if self.registry.get(&user_id).is_some()
            && self.registry.remove_if_current(&user_id, connection.id())
        {
            info!(
                "Deregistered connection {} for user {} ({notice})",
                connection.id(),
                user_id
            );
            return Ok(Some(user_id));
        }

        debug!(
            "Session registry holds no session for user {} on connection {}",
            user_id,
            connection.id()
        );
        Ok(None)
    }

    fn resolve<'a>(
        connection: Option<&'a Connection>,
        auth: Option<&AuthContext>,
    ) -> Result<(&'a Connection, UserId)> {
        let connection = connection.ok_or_else(|| invalid_connection("Connection is absent"))?;

        if connection.id().is_empty() {
            return Err(invalid_connection("Connection id is empty"));
        }

        let user_id = PrincipalResolver::resolve_user_id(connection, auth)
            .ok_or_else(|| unresolved_identity("User id could not be resolved"))?;

        Ok((connection, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionId;
    use crate::error::ErrorKind;
    use crate::principal::{Principal, SecurityAssertion};
    use crate::registry::InMemorySessionRegistry;

    fn connection(id: &str) -> Connection {
        let (sender, _receiver) = tokio::sync::mpsc::unbounded_channel();
        Connection::new(ConnectionId::from(id), sender)
    }

    fn context_for(name: &str) -> AuthContext {
        AuthContext::default().with_principal(Principal::Assertion(SecurityAssertion::new(name)))
    }

    fn listener() -> (LifecycleListener, Arc<InMemorySessionRegistry>) {
        let registry = Arc::new(InMemorySessionRegistry::new());
        (LifecycleListener::new(registry.clone()), registry)
    }

    #[test]
    fn test_register_then_disconnect_leaves_registry_empty() {
        let (listener, registry) = listener();
        let conn_a = connection("conn-a");
        let alice = context_for("alice");

        let user_id = listener.on_register(Some(&conn_a), Some(&alice)).unwrap();
        assert_eq!(user_id, "alice");
        assert_eq!(registry.size(), 1);

        let removed = listener
            .on_disconnect(Some(&conn_a), Some(&alice), &DisconnectNotice::ClientClosed)
            .unwrap();
        assert_eq!(removed.as_deref(), Some("alice"));
        assert_eq!(registry.size(), 0);

        let again = listener
            .on_disconnect(Some(&conn_a), Some(&alice), &DisconnectNotice::ClientClosed)
            .unwrap();
        assert!(again.is_none());
        assert_eq!(registry.size(), 0);
    }

    #[test]
    fn test_anonymous_connection_is_keyed_by_connection_id() {
        let (listener, registry) = listener();

        let user_id = listener.on_register(Some(&connection("conn-42")), None).unwrap();

        assert_eq!(user_id, "conn-42");
        assert!(registry.get("conn-42").is_some());
    }

    #[test]
    fn test_absent_connection_is_rejected() {
        let (listener, registry) = listener();
        registry.put("bob".to_string(), connection("conn-b"));

        let err = listener
            .on_register(None, Some(&context_for("alice")))
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::InvalidConnection);

        let err = listener
            .on_disconnect(None, None, &DisconnectNotice::Timeout)
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::InvalidConnection);

        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_connection_with_empty_id_is_rejected() {
        let (listener, _registry) = listener();

        let err = listener
            .on_register(Some(&connection("")), Some(&context_for("alice")))
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::InvalidConnection);
    }

    #[test]
    fn test_empty_principal_name_is_unresolved() {
        let (listener, registry) = listener();

        let err = listener
            .on_register(Some(&connection("conn-a")), Some(&context_for("")))
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::UnresolvedIdentity);
        assert_eq!(registry.size(), 0);
    }

    #[test]
    fn test_context_without_security_assertion_is_unresolved() {
        let (listener, registry) = listener();
        let conn = connection("conn-7");
        let guest = AuthContext::default().with_principal(Principal::Named("guest".to_string()));

        let err = listener.on_register(Some(&conn), Some(&guest)).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::UnresolvedIdentity);
        assert_eq!(registry.size(), 0);

        let err = listener
            .on_disconnect(Some(&conn), Some(&guest), &DisconnectNotice::ClientClosed)
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::UnresolvedIdentity);
    }

    #[test]
    fn test_reconnect_replaces_session_and_late_disconnect_keeps_it() {
        let (listener, registry) = listener();
        let alice = context_for("alice");
        let old = connection("conn-old");
        let new = connection("conn-new");

        listener.on_register(Some(&old), Some(&alice)).unwrap();
        listener.on_register(Some(&new), Some(&alice)).unwrap();

        let removed = listener
            .on_disconnect(Some(&old), Some(&alice), &DisconnectNotice::Timeout)
            .unwrap();

        assert!(removed.is_none());
        assert_eq!(
            registry.get("alice").map(|c| c.id().clone()),
            Some(ConnectionId::from("conn-new"))
        );
    }

    #[test]
    fn test_disconnect_of_unknown_user_is_a_no_op() {
        let (listener, registry) = listener();

        let removed = listener
            .on_disconnect(
                Some(&connection("conn-x")),
                Some(&context_for("carol")),
                &DisconnectNotice::Other("transport reset".to_string()),
            )
            .unwrap();

        assert!(removed.is_none());
        assert_eq!(registry.size(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lifecycle_for_distinct_connections() {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let listener = Arc::new(LifecycleListener::new(registry.clone()));

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let listener = Arc::clone(&listener);
                tokio::spawn(async move {
                    let conn = connection(&format!("conn-{i}"));
                    let auth = context_for(&format!("user-{i}"));
                    listener.on_register(Some(&conn), Some(&auth)).unwrap();
                    if i % 4 == 0 {
                        listener
                            .on_disconnect(Some(&conn), Some(&auth), &DisconnectNotice::ClientClosed)
                            .unwrap();
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.size(), 48);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reconnect_racing_late_disconnect_keeps_newest_connection() {
        for round in 0..200 {
            let (listener, registry) = listener();
            let listener = Arc::new(listener);
            let alice = context_for("alice");
            let old = connection(&format!("conn-old-{round}"));
            let new = connection(&format!("conn-new-{round}"));
            listener.on_register(Some(&old), Some(&alice)).unwrap();

            let reconnect = {
                let listener = Arc::clone(&listener);
                let alice = alice.clone();
                let new = new.clone();
                tokio::spawn(async move { listener.on_register(Some(&new), Some(&alice)).unwrap() })
            };
            let late_disconnect = {
                let listener = Arc::clone(&listener);
                let alice = alice.clone();
                tokio::spawn(async move {
                    listener
                        .on_disconnect(Some(&old), Some(&alice), &DisconnectNotice::Timeout)
                        .unwrap()
                })
            };
            reconnect.await.unwrap();
            late_disconnect.await.unwrap();

            assert_eq!(
                registry.get("alice").map(|c| c.id().clone()),
                Some(new.id().clone()),
                "round {round} lost the reconnected session"
            );
        }
    }
}

use crate::error::Result;
use crate::extractors::auth_context::RequestAuthContext;
use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use push::message::{EventType, Push};
use push::principal::AuthContext;
use push::{Connection, DisconnectNotice, LifecycleListener};
use service::AppState;
use std::convert::Infallible;
use std::sync::Arc;

/// Deregisters the connection when the stream is dropped, which is how axum
/// reports a client going away.
struct DisconnectGuard {
    lifecycle: Arc<LifecycleListener>,
    connection: Connection,
    auth: Option<AuthContext>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        debug!("SSE connection {} closed, cleaning up", self.connection.id());

        if let Err(e) = self.lifecycle.on_disconnect(
            Some(&self.connection),
            self.auth.as_ref(),
            &DisconnectNotice::ClientClosed,
        ) {
            warn!(
                "Failed to deregister SSE connection {}: {e}",
                self.connection.id()
            );
        }
    }
}

fn to_sse_event(push: &Push) -> Option<Event> {
    match push.data_json() {
        Ok(data) => Some(Event::default().event(push.event_type()).data(data)),
        Err(e) => {
            error!("Failed to serialize {} push: {e}", push.event_type());
            None
        }
    }
}

/// SSE handler that establishes a long-lived push connection.
/// One live connection per user; reconnecting replaces the previous one.
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    RequestAuthContext(auth): RequestAuthContext,
) -> Result<Sse<impl Stream<Item = core::result::Result<Event, Infallible>>>> {
    let (connection, mut receiver) = Connection::open();

    let user_id = app_state
        .lifecycle
        .on_register(Some(&connection), auth.as_ref())?;
    debug!(
        "Established SSE connection {} for user {}",
        connection.id(),
        user_id
    );

    let guard = DisconnectGuard {
        lifecycle: app_state.lifecycle.clone(),
        connection,
        auth,
    };

    // Pushes arrive from the registry's handle to this connection
    let stream = stream! {
        let _guard = guard;
        while let Some(push) = receiver.recv().await {
            if let Some(event) = to_sse_event(&push) {
                yield Ok::<_, Infallible>(event);
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(app_state.config.keep_alive_interval())))
}

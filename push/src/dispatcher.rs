use crate::connection::{Connection, UserId};
use crate::message::Push;
use crate::registry::SessionRegistry;
use async_trait::async_trait;
use events::topic::SEPARATOR;
use events::{Event, EventBus, EventHandler, TopicFilter};
use log::*;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// One feature area's view of the event bus: which topics it listens to and
/// which users each event is addressed to.
pub trait EventSource: Send + Sync {
    fn topic(&self) -> TopicFilter;

    /// Users the event should reach. Empty means nobody.
    fn targets_for(&self, event: &Event) -> HashSet<UserId>;

    /// The payload pushed to every target. Defaults to the last topic segment
    /// as the event type and the event's properties as data.
    fn message_for(&self, event: &Event) -> Push {
        let event_type = event
            .topic()
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or_default();
        Push::new(event_type, Value::Object(event.properties().clone()))
    }
}

/// Routes events from one source's topic family to the targeted users'
/// live connections.
///
/// Holds no per-event state; everything lives in the shared registry.
pub struct Dispatcher<S: EventSource> {
    source: S,
    registry: Arc<dyn SessionRegistry>,
}

impl<S: EventSource + 'static> Dispatcher<S> {
    /// Build a dispatcher and subscribe it to `source.topic()` on `bus`.
    pub async fn subscribe(
        source: S,
        registry: Arc<dyn SessionRegistry>,
        bus: &EventBus,
    ) -> Arc<Self> {
        let topic = source.topic();
        let dispatcher = Arc::new(Self::new(source, registry));
        bus.subscribe(topic, dispatcher.clone()).await;
        dispatcher
    }
}

impl<S: EventSource> Dispatcher<S> {
    pub fn new(source: S, registry: Arc<dyn SessionRegistry>) -> Self {
        Self { source, registry }
    }

    /// The live connection for `user_id`, for collaborators that need to
    /// address a user outside the event path.
    pub fn get_session_by_user_id(&self, user_id: &str) -> Option<Connection> {
        self.registry.get(user_id)
    }

    /// Push `event` to every targeted user that is online. Returns the number
    /// of pushes made; offline targets are skipped.
    pub fn dispatch(&self, event: &Event) -> usize {
        let targets = self.source.targets_for(event);
        if targets.is_empty() {
            debug!("Event on topic {} has no target users", event.topic());
            return 0;
        }

        let message = self.source.message_for(event);
        let mut pushed = 0;

        for user_id in targets.iter() {
            match self.registry.get(user_id) {
                Some(connection) => {
                    connection.push(message.clone());
                    pushed += 1;
                }
                None => trace!("User {user_id} is offline, dropping {} event", event.topic()),
            }
        }

        debug!(
            "Pushed {} event to {} of {} target user(s)",
            event.topic(),
            pushed,
            targets.len()
        );
        pushed
    }
}

#[async_trait]
impl<S: EventSource> EventHandler for Dispatcher<S> {
    async fn handle(&self, event: &Event) {
        self.dispatch(event);
    }
}

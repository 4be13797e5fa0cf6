//! Process-wide event bus for the push router.
//!
//! This crate decouples the code that produces events from the components
//! that deliver them to connected users.
//!
//! # Architecture
//!
//! - **Event**: a topic plus a JSON property map
//! - **TopicFilter**: the topic family a handler subscribes to
//! - **EventHandler**: trait for implementing event handlers
//! - **EventBus**: routes published events to every handler whose filter matches
//!
//! This crate has no dependencies on internal crates, so any layer can publish.

use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod topic;

pub use topic::TopicFilter;

/// A typed notification published on the bus.
///
/// Properties are carried as `serde_json::Value` so producers do not need to
/// share types with the handlers that consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    topic: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

impl Event {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            properties: Map::new(),
        }
    }

    /// Adds a property, replacing any previous value under the same key.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

/// Trait for handling events delivered by the bus.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event);
}

struct Subscription {
    filter: TopicFilter,
    handler: Arc<dyn EventHandler>,
}

/// Delivers published events to subscribed handlers.
///
/// Cloning is cheap and every clone shares the same subscriptions, so one bus
/// built at startup can be handed to every producer and subscriber.
#[derive(Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every topic matched by `filter`.
    pub async fn subscribe(&self, filter: TopicFilter, handler: Arc<dyn EventHandler>) {
        info!("Subscribing event handler to topic {filter}");
        self.subscriptions
            .write()
            .await
            .push(Subscription { filter, handler });
    }

    /// Publish an event to all matching handlers and return how many received it.
    /// Handlers are called sequentially in subscription order.
    pub async fn publish(&self, event: Event) -> usize {
        // Snapshot the matching handlers so no lock is held while they run.
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .subscriptions
            .read()
            .await
            .iter()
            .filter(|subscription| subscription.filter.matches(event.topic()))
            .map(|subscription| Arc::clone(&subscription.handler))
            .collect();

        if handlers.is_empty() {
            trace!("No handlers subscribed to topic {}", event.topic());
        }

        for handler in handlers.iter() {
            handler.handle(&event).await;
        }

        handlers.len()
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

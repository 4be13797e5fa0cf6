use config::Config;
use events::EventBus;
use log::info;
use push::sources::{ActivitySource, NotificationSource};
use push::{Dispatcher, InMemorySessionRegistry, LifecycleListener, SessionRegistry};
use std::sync::Arc;

pub mod config;
pub mod logging;

// Process-wide push routing state. Built once at startup; every clone shares
// the same registry, bus and dispatchers for the life of the process.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<dyn SessionRegistry>,
    pub lifecycle: Arc<LifecycleListener>,
    pub event_bus: EventBus,
    pub notifications: Arc<Dispatcher<NotificationSource>>,
    pub activities: Arc<Dispatcher<ActivitySource>>,
}

impl AppState {
    /// Build the shared registry and subscribe one dispatcher per feature area.
    pub async fn init(app_config: Config) -> Self {
        let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::with_capacity(
            app_config.registry_capacity,
        ));
        let event_bus = EventBus::new();

        Self::with_registry(app_config, registry, event_bus).await
    }

    /// Like `init`, but with an externally constructed registry and bus.
    pub async fn with_registry(
        app_config: Config,
        registry: Arc<dyn SessionRegistry>,
        event_bus: EventBus,
    ) -> Self {
        let lifecycle = Arc::new(LifecycleListener::new(registry.clone()));
        let notifications =
            Dispatcher::subscribe(NotificationSource, registry.clone(), &event_bus).await;
        let activities = Dispatcher::subscribe(ActivitySource, registry.clone(), &event_bus).await;

        info!(
            "Push routing ready with {} dispatcher subscription(s)",
            event_bus.subscription_count().await
        );

        Self {
            config: app_config,
            registry,
            lifecycle,
            event_bus,
            notifications,
            activities,
        }
    }
}

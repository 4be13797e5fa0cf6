//! User-addressed push routing.
//!
//! This crate maps each user to the one connection they are currently pushed
//! over, and routes bus events addressed to a user onto that connection.
//!
//! # Architecture
//!
//! - **One session per user**: a user reconnecting replaces their previous
//!   session (last writer wins).
//! - **Injected registry**: a single `SessionRegistry` is built at startup and
//!   shared by `Arc` between the lifecycle listener and every dispatcher.
//! - **Identity fallback**: connections without an authenticated principal are
//!   keyed by their own connection id.
//! - **Ephemeral pushes**: if a user is offline the event is dropped for them.
//!
//! # Message Flow
//!
//! 1. Transport opens a connection and calls `LifecycleListener::on_register`
//! 2. `PrincipalResolver` turns the auth context into a user id
//! 3. The connection is stored in the `SessionRegistry` under that id
//! 4. A producer publishes an `events::Event` on the bus
//! 5. The matching `Dispatcher` asks its `EventSource` for target users, looks
//!    each up in the registry and pushes over the connections it finds
//! 6. Transport closes the connection and calls `LifecycleListener::on_disconnect`
//!
//! # Example: wiring a dispatcher
//!
//! ```rust,ignore
//! use push::registry::{InMemorySessionRegistry, SessionRegistry};
//! use push::sources::NotificationSource;
//! use push::Dispatcher;
//!
//! let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());
//! let bus = events::EventBus::new();
//! let notifications = Dispatcher::subscribe(NotificationSource, registry.clone(), &bus).await;
//!
//! bus.publish(Event::new("notifications/create").with_property("user", "alice")).await;
//! ```
//!
//! # Modules
//!
//! - `connection`: `Connection` handle and type-safe `ConnectionId`
//! - `registry`: `SessionRegistry` trait and its DashMap implementation
//! - `principal`: auth context model and `PrincipalResolver`
//! - `lifecycle`: connect/disconnect handling
//! - `dispatcher`: `EventSource` trait and the shared `Dispatcher`
//! - `sources`: notification and activity event sources
//! - `message`: the `Push` payload

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod message;
pub mod principal;
pub mod registry;
pub mod sources;

pub use connection::{Connection, ConnectionId, UserId};
pub use dispatcher::{Dispatcher, EventSource};
pub use lifecycle::{DisconnectNotice, LifecycleListener};
pub use registry::{InMemorySessionRegistry, SessionRegistry};

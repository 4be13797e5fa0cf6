//! Event sources for each feature area that pushes to users.
//!
//! Producers address an event with a `user` property (a single user id) and,
//! for activities, optionally a `users` array.

use crate::connection::UserId;
use crate::dispatcher::EventSource;
use events::{Event, TopicFilter};
use serde_json::Value;
use std::collections::HashSet;

pub const NOTIFICATIONS_TOPIC: &str = "notifications/*";
pub const ACTIVITIES_TOPIC: &str = "activities/*";

/// Property naming the single user an event is addressed to.
pub const USER_PROPERTY: &str = "user";
/// Property listing several users an event is addressed to.
pub const USERS_PROPERTY: &str = "users";

fn single_user(event: &Event) -> Option<UserId> {
    event
        .property(USER_PROPERTY)
        .and_then(Value::as_str)
        .filter(|user_id| !user_id.is_empty())
        .map(str::to_string)
}

fn listed_users(event: &Event) -> impl Iterator<Item = UserId> + '_ {
    event
        .property(USERS_PROPERTY)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter(|user_id| !user_id.is_empty())
        .map(str::to_string)
}

/// User-facing notifications, e.g. `notifications/create`.
pub struct NotificationSource;

impl EventSource for NotificationSource {
    fn topic(&self) -> TopicFilter {
        TopicFilter::parse(NOTIFICATIONS_TOPIC)
    }

    fn targets_for(&self, event: &Event) -> HashSet<UserId> {
        single_user(event).into_iter().collect()
    }
}

/// Progress of long-running activities, e.g. `activities/update`.
/// An activity can be shared by several users.
pub struct ActivitySource;

impl EventSource for ActivitySource {
    fn topic(&self) -> TopicFilter {
        TopicFilter::parse(ACTIVITIES_TOPIC)
    }

    fn targets_for(&self, event: &Event) -> HashSet<UserId> {
        single_user(event).into_iter().chain(listed_users(event)).collect()
    }
}

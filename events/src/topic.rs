use std::fmt;

/// Topic separator used by every event topic, e.g. `notifications/create`.
pub const SEPARATOR: char = '/';

const WILDCARD: &str = "*";

/// Selects the family of topics a handler wants delivered to it.
///
/// A filter is either an exact topic (`notifications/create`) or a prefix
/// ending in a wildcard segment (`notifications/*`), which matches every
/// topic below that prefix at any depth. A bare `*` matches all topics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicFilter {
    Exact(String),
    Prefix(String),
    All,
}

impl TopicFilter {
    pub fn parse(filter: &str) -> Self {
        if filter == WILDCARD {
            return TopicFilter::All;
        }

        match filter.strip_suffix(WILDCARD) {
            Some(prefix) if prefix.ends_with(SEPARATOR) => {
                TopicFilter::Prefix(prefix.trim_end_matches(SEPARATOR).to_string())
            }
            _ => TopicFilter::Exact(filter.to_string()),
        }
    }

    /// Returns true when `topic` belongs to this filter's family.
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Exact(exact) => exact == topic,
            TopicFilter::Prefix(prefix) => topic
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(SEPARATOR))
                .is_some_and(|rest| !rest.is_empty()),
        }
    }
}

impl From<&str> for TopicFilter {
    fn from(filter: &str) -> Self {
        TopicFilter::parse(filter)
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TopicFilter::All => write!(f, "{WILDCARD}"),
            TopicFilter::Exact(exact) => write!(f, "{exact}"),
            TopicFilter::Prefix(prefix) => write!(f, "{prefix}{SEPARATOR}{WILDCARD}"),
        }
    }
}

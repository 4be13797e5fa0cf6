//! Error types for the `push` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding
//! an error kind and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type for push routing operations.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of failures that can occur while routing pushes to users.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// A lifecycle callback received an absent or unidentifiable connection.
    InvalidConnection,
    /// Neither the security context nor the connection produced a usable user id.
    UnresolvedIdentity,
    /// The security-context provider failed or was unreachable.
    /// Recovered locally by falling back to the connection identifier.
    IdentityProviderUnavailable,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Push error: {:?} ({source})", self.error_kind),
            None => write!(f, "Push error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }
}

/// Helper function to create invalid connection errors.
pub fn invalid_connection(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::InvalidConnection,
    }
}

/// Helper function to create unresolved identity errors.
pub fn unresolved_identity(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::UnresolvedIdentity,
    }
}

/// Helper function to create identity provider errors.
pub fn identity_provider_unavailable(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::IdentityProviderUnavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = unresolved_identity("empty principal name");

        assert_eq!(
            err.to_string(),
            "Push error: UnresolvedIdentity (empty principal name)"
        );
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_from_kind_has_no_source() {
        let err: Error = ErrorKind::InvalidConnection.into();

        assert_eq!(err.error_kind, ErrorKind::InvalidConnection);
        assert!(StdError::source(&err).is_none());
    }
}

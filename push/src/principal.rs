//! Resolves the user id a connection is registered under.
//!
//! An authenticated connection is keyed by the principal name carried in its
//! security assertion. Connections without an authenticated principal are
//! keyed by their own connection id, so anonymous clients still get pushes.

use crate::connection::{Connection, UserId};
use crate::error::Result;
use log::*;

/// A signed statement about an authenticated user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityAssertion {
    principal_name: String,
    issuer: Option<String>,
}

impl SecurityAssertion {
    pub fn new(principal_name: impl Into<String>) -> Self {
        Self {
            principal_name: principal_name.into(),
            issuer: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn principal_name(&self) -> &str {
        &self.principal_name
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }
}

/// One principal attached to an authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// The recognized kind; its principal name becomes the user id.
    Assertion(SecurityAssertion),
    /// Any other principal kind (session markers, roles, ...). Never used as a user id.
    Named(String),
}

/// The authenticated subject associated with a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    principals: Vec<Principal>,
}

impl AuthContext {
    pub fn new(principals: Vec<Principal>) -> Self {
        Self { principals }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    pub fn principals(&self) -> &[Principal] {
        &self.principals
    }

    /// First security assertion in iteration order. When several are present
    /// the first one wins.
    pub fn first_assertion(&self) -> Option<&SecurityAssertion> {
        self.principals.iter().find_map(|principal| match principal {
            Principal::Assertion(assertion) => Some(assertion),
            Principal::Named(_) => None,
        })
    }

    /// Obtain the current subject from `provider`.
    ///
    /// A failing provider is treated as "no authenticated context" so the
    /// caller falls back to the connection id instead of failing.
    pub fn from_provider(provider: &dyn SecurityContextProvider) -> Option<Self> {
        match provider.current_subject() {
            Ok(subject) => subject,
            Err(e) => {
                info!("Couldn't obtain the current subject from the security context: {e}");
                None
            }
        }
    }
}

/// External source of the authenticated subject for the connection being handled.
#[cfg_attr(test, mockall::automock)]
pub trait SecurityContextProvider: Send + Sync {
    /// `Ok(None)` means no one is authenticated; `Err` means the provider itself failed.
    fn current_subject(&self) -> Result<Option<AuthContext>>;
}

pub struct PrincipalResolver;

impl PrincipalResolver {
    /// Without a context the connection id is used. A context that carries no
    /// security assertion, or an empty identifier, resolves to `None`.
    pub fn resolve_user_id(connection: &Connection, auth: Option<&AuthContext>) -> Option<UserId> {
        let user_id = match auth.map(|context| (context, context.first_assertion())) {
            Some((_, Some(assertion))) => assertion.principal_name(),
            Some((context, None)) => {
                debug!(
                    "No security assertion among {} principal(s) for connection {}",
                    context.principals().len(),
                    connection.id()
                );
                return None;
            }
            None => connection.id().as_str(),
        };

        if user_id.is_empty() {
            None
        } else {
            Some(user_id.to_string())
        }
    }
}

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use log::*;
use push::error::{identity_provider_unavailable, Result};
use push::principal::{AuthContext, Principal, SecurityAssertion, SecurityContextProvider};
use service::AppState;
use std::convert::Infallible;

/// Issuer recorded on assertions taken from the proxy header.
const PROXY_ISSUER: &str = "reverse-proxy";

/// Security context asserted by an authenticating reverse proxy through a
/// trusted request header. Only deploy behind a proxy that strips this
/// header from client requests: a client that can set it directly can claim
/// any user and, since the newest registration wins, take over their session.
pub struct HeaderSecurityContext<'a> {
    header_name: &'a str,
    headers: &'a HeaderMap,
}

impl<'a> HeaderSecurityContext<'a> {
    pub fn new(header_name: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            header_name,
            headers,
        }
    }
}

impl SecurityContextProvider for HeaderSecurityContext<'_> {
    fn current_subject(&self) -> Result<Option<AuthContext>> {
        let Some(value) = self.headers.get(self.header_name) else {
            return Ok(None);
        };

        let principal_name = value
            .to_str()
            .map_err(|_| identity_provider_unavailable("Principal header is not valid UTF-8"))?
            .trim();

        if principal_name.is_empty() {
            return Ok(None);
        }

        Ok(Some(AuthContext::default().with_principal(Principal::Assertion(
            SecurityAssertion::new(principal_name).with_issuer(PROXY_ISSUER),
        ))))
    }
}

/// The auth context for the current request, `None` for anonymous clients.
pub(crate) struct RequestAuthContext(pub Option<AuthContext>);

#[async_trait]
impl FromRequestParts<AppState> for RequestAuthContext {
    type Rejection = Infallible;

    // Anonymous clients are allowed; they are keyed by their connection id.
    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> core::result::Result<Self, Self::Rejection> {
        let header_name = app_state.config.principal_header();
        let provider = HeaderSecurityContext::new(&header_name, &parts.headers);
        let auth = AuthContext::from_provider(&provider);

        trace!("Resolved request auth context: {auth:?}");
        Ok(RequestAuthContext(auth))
    }
}

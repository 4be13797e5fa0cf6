use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use push::error::{Error as PushError, ErrorKind as PushErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(PushError);

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Rejecting push connection: {}", self.0);

        match self.0.error_kind {
            PushErrorKind::InvalidConnection => {
                (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
            }
            PushErrorKind::UnresolvedIdentity => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
            }
            PushErrorKind::IdentityProviderUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<PushError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

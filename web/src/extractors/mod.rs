pub(crate) mod auth_context;

pub use auth_context::HeaderSecurityContext;

//! SSE transport for the web layer.
//!
//! This module contains only the Axum handler that binds an SSE stream to the
//! push crate's lifecycle listener. Registry, resolution and dispatch live in
//! the `push` crate.

pub mod handler;
